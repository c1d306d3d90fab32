//! End-to-end: render synthetic glyphs for every digit in several "fonts",
//! train to 100% fit, and verify the persisted model preserves every
//! prediction.

use image::{GrayImage, Luma};

use digit_ocr::{
    accuracy_report, glyph_features, train_and_save, Activation, GlyphRasterizer, NeuralNetwork,
    SampleSet, TrainerConfig, TrainingOutcome, FEATURE_LEN,
};

/// A deterministic stand-in for an installed font: each digit gets a
/// distinct block pattern inside an 8x10 metric box, varying per font
/// variant. Patterns differ in shape (not just position), so the centering
/// correction does not collapse variants of the same digit into one image.
struct BlockFont {
    variant: u32,
}

const INK_W: u32 = 6;
const INK_H: u32 = 8;

impl BlockFont {
    fn lit(&self, digit: u32, cell_x: u32, cell_y: u32) -> bool {
        // mixes digit, variant and cell into a stable pseudo-random mask
        let hash = digit
            .wrapping_mul(2_654_435_761)
            .wrapping_add(self.variant.wrapping_mul(40_503))
            .wrapping_add(cell_y.wrapping_mul(97))
            .wrapping_add(cell_x.wrapping_mul(31));
        (cell_x == 0 && cell_y == 0) || hash % 7 < 3
    }
}

impl GlyphRasterizer for BlockFont {
    fn measure(&self, _glyph: char) -> (u32, u32) {
        // deliberately larger than the ink, with all slack on one side,
        // so metric centering alone would be visibly off
        (INK_W + 3, INK_H + 4)
    }

    fn draw(&self, glyph: char, x: f32, y: f32, canvas: &mut GrayImage) {
        let digit = glyph.to_digit(10).expect("glyph is a digit");

        for cell_y in 0..INK_H {
            for cell_x in 0..INK_W {
                if !self.lit(digit, cell_x, cell_y) {
                    continue;
                }

                let px = x.round() as i64 + i64::from(cell_x);
                let py = y.round() as i64 + i64::from(cell_y);
                if px >= 0
                    && py >= 0
                    && (px as u32) < canvas.width()
                    && (py as u32) < canvas.height()
                {
                    canvas.put_pixel(px as u32, py as u32, Luma([255]));
                }
            }
        }
    }
}

fn render_samples(fonts: u32) -> SampleSet {
    let mut samples = SampleSet::new();

    for variant in 0..fonts {
        let font = BlockFont { variant };
        for digit in 0..10_u8 {
            let glyph = char::from_digit(u32::from(digit), 10).unwrap();
            let features = glyph_features(&font, glyph).unwrap();
            samples.insert(digit, features).unwrap();
        }
    }

    samples
}

#[test]
fn trains_to_full_accuracy_and_survives_reload() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let samples = render_samples(3);
    assert_eq!(samples.sample_count(), 30);

    let mut network = NeuralNetwork::new(
        7,
        &[FEATURE_LEN, 30, 30, 30, 1],
        &[Activation::TanH; 4],
        false,
    )
    .unwrap()
    .with_learning_rate(0.02);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("digits.ai");

    let config = TrainerConfig {
        max_epochs: 20_000,
        warmup_epochs: 100,
        report_interval: 500,
    };

    let outcome = train_and_save(&mut network, &samples, config, &path, |_| true).unwrap();
    assert!(
        matches!(outcome, TrainingOutcome::Converged { .. }),
        "training did not converge: {outcome:?}"
    );

    // every sample's rounded prediction matches its label
    let report = accuracy_report(&network, &samples).unwrap();
    assert_eq!(report.len(), 30);
    assert!(report.iter().all(|row| row.matched));

    // the persisted model reproduces every prediction
    let restored = NeuralNetwork::load(&path).unwrap();
    for (digit, features) in samples.samples() {
        let before = network.predict(features).unwrap();
        let after = restored.predict(features).unwrap();

        assert_eq!(before.digit, digit);
        assert_eq!(before.digit, after.digit);
        assert!((before.raw - after.raw).abs() < 1e-12);
    }
}

#[test]
fn blank_canvas_is_a_legal_input() {
    let network = NeuralNetwork::new(
        1,
        &[FEATURE_LEN, 30, 1],
        &[Activation::TanH, Activation::TanH],
        false,
    )
    .unwrap();

    // an untouched drawing canvas must flow through without failure
    let prediction = network.predict(&vec![0.0; FEATURE_LEN]).unwrap();
    assert!(prediction.digit <= 9);
}

#[test]
fn variants_of_one_digit_stay_distinct_after_centering() {
    let a = glyph_features(&BlockFont { variant: 0 }, '5').unwrap();
    let b = glyph_features(&BlockFont { variant: 1 }, '5').unwrap();

    assert_ne!(a, b);
}
