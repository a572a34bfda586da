/// Symbol drawn when no destination pattern matches.
pub const DEFAULT_EMOJI: &str = "✈️";

// Checked top to bottom; a city comes before its country so the landmark wins.
const DESTINATIONS: &[(&str, &str)] = &[
    ("tokyo", "🗼"),
    ("東京", "🗼"),
    ("东京", "🗼"),
    ("kyoto", "⛩️"),
    ("京都", "⛩️"),
    ("osaka", "🏯"),
    ("大阪", "🏯"),
    ("japan", "🗾"),
    ("日本", "🗾"),
    ("seoul", "🇰🇷"),
    ("首爾", "🇰🇷"),
    ("korea", "🇰🇷"),
    ("韓國", "🇰🇷"),
    ("韩国", "🇰🇷"),
    ("taipei", "🇹🇼"),
    ("台北", "🇹🇼"),
    ("taiwan", "🇹🇼"),
    ("台灣", "🇹🇼"),
    ("台湾", "🇹🇼"),
    ("bangkok", "🇹🇭"),
    ("曼谷", "🇹🇭"),
    ("thailand", "🇹🇭"),
    ("泰國", "🇹🇭"),
    ("泰国", "🇹🇭"),
    ("vietnam", "🇻🇳"),
    ("越南", "🇻🇳"),
    ("singapore", "🇸🇬"),
    ("新加坡", "🇸🇬"),
    ("hong kong", "🇭🇰"),
    ("香港", "🇭🇰"),
    ("beijing", "🇨🇳"),
    ("北京", "🇨🇳"),
    ("shanghai", "🇨🇳"),
    ("上海", "🇨🇳"),
    ("china", "🇨🇳"),
    ("中國", "🇨🇳"),
    ("中国", "🇨🇳"),
    ("new york", "🗽"),
    ("紐約", "🗽"),
    ("usa", "🇺🇸"),
    ("america", "🇺🇸"),
    ("美國", "🇺🇸"),
    ("美国", "🇺🇸"),
    ("paris", "🗼"),
    ("巴黎", "🗼"),
    ("france", "🇫🇷"),
    ("法國", "🇫🇷"),
    ("法国", "🇫🇷"),
    ("rome", "🏛️"),
    ("羅馬", "🏛️"),
    ("italy", "🇮🇹"),
    ("義大利", "🇮🇹"),
    ("意大利", "🇮🇹"),
    ("barcelona", "🇪🇸"),
    ("spain", "🇪🇸"),
    ("西班牙", "🇪🇸"),
    ("london", "🇬🇧"),
    ("倫敦", "🇬🇧"),
    ("england", "🇬🇧"),
    ("英國", "🇬🇧"),
    ("英国", "🇬🇧"),
    ("uk", "🇬🇧"),
    ("germany", "🇩🇪"),
    ("德國", "🇩🇪"),
    ("德国", "🇩🇪"),
    ("sydney", "🇦🇺"),
    ("australia", "🇦🇺"),
    ("澳洲", "🇦🇺"),
    ("bali", "🏝️"),
    ("峇里島", "🏝️"),
    ("巴厘岛", "🏝️"),
    ("maldives", "🏝️"),
    ("馬爾代夫", "🏝️"),
    ("马尔代夫", "🏝️"),
    ("hawaii", "🌺"),
    ("夏威夷", "🌺"),
    ("dubai", "🏙️"),
    ("杜拜", "🏙️"),
    ("迪拜", "🏙️"),
];

/// Symbol for a destination, by case-insensitive substring match.
pub fn destination_emoji(destination: &str) -> &'static str {
    let dest = destination.to_lowercase();
    DESTINATIONS
        .iter()
        .find(|(pattern, _)| dest.contains(pattern))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}
