//! Rendering real encoded symbols to images.

use qrbind::render::{render_image, DrawOptions};
use qrbind::{init, Ecc};

#[test]
fn rendered_symbol_matches_the_matrix_cell_for_cell() {
    let encoder = init().unwrap();
    let matrix = encoder.encode_text_with("RENDER TEST", Ecc::Medium).unwrap();
    let image = render_image(&matrix, 1, &DrawOptions::default());
    let side = matrix.size() as u32;
    assert_eq!((image.width(), image.height()), (side, side));
    for y in 0..side {
        for x in 0..side {
            let dark = matrix.is_dark(x as usize, y as usize);
            let expected = if dark { 0 } else { 255 };
            assert_eq!(image.get_pixel(x, y).0[0], expected, "at ({x},{y})");
        }
    }
}

#[test]
fn quiet_zone_padding_surrounds_the_symbol() {
    let encoder = init().unwrap();
    let matrix = encoder.encode_text("padded").unwrap();
    let options = DrawOptions {
        padding: 8,
        ..DrawOptions::default()
    };
    let image = render_image(&matrix, 3, &options);
    let side = matrix.size() as u32;
    assert_eq!(image.width(), side * 3 + 16);
    for i in 0..image.width() {
        for frame in 0..8 {
            assert_eq!(image.get_pixel(i, frame).0, [255, 255, 255, 255]);
            assert_eq!(image.get_pixel(frame, i).0, [255, 255, 255, 255]);
        }
    }
    // First module inside the frame is the dark finder corner.
    assert_eq!(image.get_pixel(8, 8).0, [0, 0, 0, 255]);
}
