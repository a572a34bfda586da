use std::io::Cursor;

use image::{GenericImageView, ImageFormat, RgbaImage};
use rstest::rstest;
use tripos_core::card::{Color, Scene, Shape, TextMeasure, TextStyle, render_png};
use tripos_core::{AspectRatio, CardLabels, FontBook, QrAsset, TripSummary, export_card};

fn summary() -> TripSummary {
    TripSummary::builder("Kyoto")
        .duration_label("4 days")
        .travelers("2 adults")
        .budget("Mid-range")
        .pace_label("Slow")
        .highlights(["Fushimi Inari", "Gion at dusk", "Arashiyama"])
        .share_url("https://tripos.app/?share=Ab3dE6gH&lang=en")
        .build()
}

fn qr_png() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    RgbaImage::from_pixel(8, 8, image::Rgba([30, 41, 59, 255]))
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[test]
fn square_card_renders_at_full_size() {
    let fonts = FontBook::embedded("Libertinus Serif").unwrap();
    let card = export_card(
        &summary(),
        AspectRatio::Square,
        &CardLabels::default(),
        &fonts,
        &QrAsset::Unavailable,
    )
    .unwrap();

    assert_eq!(card.filename, "TripOS-Kyoto-1x1.png");
    let decoded = image::load_from_memory(&card.png).unwrap();
    assert_eq!(decoded.dimensions(), (1080, 1080));

    // background corner is dark, card interior is near white
    let corner = decoded.get_pixel(0, 0);
    assert!(corner[0] < 80 && corner[1] < 80 && corner[2] < 100, "{corner:?}");
    let inside = decoded.get_pixel(1000, 900);
    assert!(inside[0] > 200 && inside[1] > 200 && inside[2] > 200, "{inside:?}");
}

#[test]
fn story_card_embeds_qr_image() {
    let fonts = FontBook::embedded("Libertinus Serif").unwrap();
    let qr = QrAsset::from_bytes(&qr_png()).unwrap();
    let card = export_card(
        &summary(),
        AspectRatio::Story,
        &CardLabels::default(),
        &fonts,
        &qr,
    )
    .unwrap();

    assert_eq!(card.filename, "TripOS-Kyoto-9x16.png");
    assert_eq!((card.width, card.height), (1080, 1920));
    let decoded = image::load_from_memory(&card.png).unwrap();
    assert_eq!(decoded.dimensions(), (1080, 1920));

    // middle of the 200px QR slot at y = 1520
    let qr_center = decoded.get_pixel(540, 1620);
    assert!(qr_center[0] < 80 && qr_center[2] < 100, "{qr_center:?}");
}

#[test]
fn concurrent_exports_do_not_interfere() {
    let fonts = FontBook::embedded("Libertinus Serif").unwrap();
    let labels = CardLabels::default();

    let (a, b) = std::thread::scope(|scope| {
        let a = scope.spawn(|| {
            let summary = TripSummary::builder("Oslo").build();
            export_card(&summary, AspectRatio::Square, &labels, &fonts, &QrAsset::Unavailable)
        });
        let b = scope.spawn(|| {
            let summary = TripSummary::builder("Lima").build();
            export_card(&summary, AspectRatio::Story, &labels, &fonts, &QrAsset::Unavailable)
        });
        (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
    });

    assert_eq!(image::load_from_memory(&a.png).unwrap().dimensions(), (1080, 1080));
    assert_eq!(image::load_from_memory(&b.png).unwrap().dimensions(), (1080, 1920));
}

/// Rightmost column holding a dark pixel.
fn ink_right_edge(png: &[u8]) -> u32 {
    let decoded = image::load_from_memory(png).unwrap().to_rgba8();
    (0..decoded.width())
        .rev()
        .find(|&x| (0..decoded.height()).any(|y| decoded.get_pixel(x, y)[0] < 128))
        .map(|x| x + 1)
        .unwrap_or(0)
}

#[rstest]
#[case("AVATAR Tokyo")]
#[case("🗼 Kyoto")]
#[case("📅 5 days")]
#[case("✨ Trip Highlights")]
fn measured_width_matches_drawn_ink(#[case] text: &str) {
    let fonts = FontBook::embedded("Libertinus Serif").unwrap();
    let style = TextStyle::bold(100.0);
    let x = 10.0;

    let mut scene = Scene::new(1100, 200);
    scene.push(Shape::Rect {
        x: 0.0,
        y: 0.0,
        width: 1100.0,
        height: 200.0,
        radius: 0.0,
        fill: Color::WHITE,
        shadow: None,
    });
    scene.text(x, 150.0, text, style, Color::hex(0));
    let png = render_png(&scene, &fonts, &QrAsset::Unavailable).unwrap();

    let measured = x + fonts.width(text, style);
    let drawn = ink_right_edge(&png) as f64;
    assert!(drawn > x, "nothing drawn for {text}");
    assert!(
        (measured - drawn).abs() <= 12.0,
        "{text}: measured right edge {measured:.1}, ink ends at {drawn}"
    );
}
