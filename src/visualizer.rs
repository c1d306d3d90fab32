use image::{GrayImage, Luma};

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_LEN, FEATURE_SIDE};
use crate::network::NeuralNetwork;

/// Renders the network's topology and weights to a raster image.
///
/// Layers are laid out left to right, neurons top to bottom within their
/// layer. Each connection is drawn as a line whose brightness grows with the
/// absolute weight, normalised against the largest weight in the network, so
/// the strongest paths stand out. Read-only: the network is not touched.
pub fn render(network: &NeuralNetwork, width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        Err(Error::InvalidDimensions)?;
    }

    let topology = network.topology();
    let mut image = GrayImage::new(width, height);

    let x_of = |layer: usize| (layer as f32 + 0.5) * width as f32 / topology.len() as f32;
    let y_of = |layer: usize, neuron: usize| {
        (neuron as f32 + 1.0) * height as f32 / (topology[layer] as f32 + 1.0)
    };

    let max_abs = network
        .weights()
        .iter()
        .flatten()
        .flatten()
        .fold(0.0_f64, |max, w| max.max(w.abs()));

    if max_abs > 0.0 {
        for (l, matrix) in network.weights().iter().enumerate() {
            for (to, row) in matrix.iter().enumerate() {
                for (from, weight) in row.iter().enumerate() {
                    let level = ((weight.abs() / max_abs) * 255.0).round() as u8;
                    if level == 0 {
                        continue;
                    }
                    draw_line(
                        &mut image,
                        (x_of(l), y_of(l, from)),
                        (x_of(l + 1), y_of(l + 1, to)),
                        level,
                    );
                }
            }
        }
    }

    // neurons on top of the edges
    for (l, count) in topology.iter().enumerate() {
        for n in 0..*count {
            draw_node(&mut image, x_of(l), y_of(l, n));
        }
    }

    Ok(image)
}

/// Draws a feature vector with each pixel enlarged to a `scale` x `scale`
/// block, black ink on a white background.
pub fn render_feature(features: &FeatureVector, scale: u32) -> Result<GrayImage> {
    if scale == 0 {
        Err(Error::InvalidDimensions)?;
    }
    if features.len() != FEATURE_LEN {
        Err(Error::DimensionMismatch {
            expected: FEATURE_LEN,
            actual: features.len(),
        })?;
    }

    let side = FEATURE_SIDE * scale;
    let mut image = GrayImage::new(side, side);

    for (i, value) in features.iter().enumerate() {
        let level = ((1.0 - value.clamp(0.0, 1.0)) * 255.0).round() as u8;
        let (cell_x, cell_y) = (i as u32 % FEATURE_SIDE, i as u32 / FEATURE_SIDE);

        for dy in 0..scale {
            for dx in 0..scale {
                image.put_pixel(cell_x * scale + dx, cell_y * scale + dy, Luma([level]));
            }
        }
    }

    Ok(image)
}

/// Plots a line by stepping along its longer axis, keeping the brighter of
/// the existing and new value where lines cross.
fn draw_line(image: &mut GrayImage, from: (f32, f32), to: (f32, f32), level: u8) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let (x, y) = (from.0 + dx * t, from.1 + dy * t);

        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            pixel.0[0] = pixel.0[0].max(level);
        }
    }
}

fn draw_node(image: &mut GrayImage, x: f32, y: f32) {
    for dy in -1_i32..=1 {
        for dx in -1_i32..=1 {
            let (px, py) = (x as i32 + dx, y as i32 + dy);
            if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
                image.put_pixel(px as u32, py as u32, Luma([255]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;

    fn small_net() -> NeuralNetwork {
        NeuralNetwork::new(
            5,
            &[4, 3, 1],
            &[Activation::TanH, Activation::TanH],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_render_size_and_determinism() {
        let network = small_net();

        let image = render(&network, 120, 60).unwrap();
        assert_eq!(image.dimensions(), (120, 60));
        assert!(image.pixels().any(|pixel| pixel.0[0] > 0));

        // pure function of the parameters
        let again = render(&network, 120, 60).unwrap();
        assert_eq!(image.as_raw(), again.as_raw());
    }

    #[test]
    fn test_render_rejects_zero_dimensions() {
        let network = small_net();
        assert!(matches!(
            render(&network, 0, 60).unwrap_err(),
            Error::InvalidDimensions
        ));
        assert!(matches!(
            render(&network, 120, 0).unwrap_err(),
            Error::InvalidDimensions
        ));
    }

    #[test]
    fn test_render_does_not_mutate_network() {
        let network = small_net();
        let before = network.weights().clone();

        render(&network, 90, 30).unwrap();
        assert_eq!(&before, network.weights());
    }

    #[test]
    fn test_render_feature_blocks() {
        let mut features = vec![0.0; FEATURE_LEN];
        features[0] = 1.0; // top-left cell fully lit -> drawn black

        let image = render_feature(&features, 3).unwrap();
        assert_eq!(image.dimensions(), (42, 42));
        assert_eq!(image.get_pixel(1, 1).0[0], 0);
        assert_eq!(image.get_pixel(4, 1).0[0], 255);
    }

    #[test]
    fn test_render_feature_validates_input() {
        assert!(matches!(
            render_feature(&vec![0.0; FEATURE_LEN], 0).unwrap_err(),
            Error::InvalidDimensions
        ));
        assert!(matches!(
            render_feature(&vec![0.0; 5], 2).unwrap_err(),
            Error::DimensionMismatch { expected: 196, .. }
        ));
    }
}
