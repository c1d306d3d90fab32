//! Optical-character-style recognition of the digits 0-9 at very low
//! resolution.
//!
//! Glyphs are rendered onto a 14x14 canvas (with a pixel-accurate centering
//! correction, since font metrics are a poor proxy for the visual bounding
//! box), turned into normalized 196-element feature vectors, and fed to a
//! feedforward network trained by single-sample backpropagation until every
//! training sample is classified correctly. The digit is encoded on a single
//! output neuron as `digit / 10`.
//!
//! Rendering of actual fonts is left to the caller through the
//! [`GlyphRasterizer`] trait; this crate only consumes pixel buffers. All of
//! the core runs single-threaded -- long training runs belong on a worker
//! thread, with the epoch progress callback marshalled back by the caller.

pub mod activation;
pub mod dataset;
pub mod error;
pub mod features;
pub mod math;
pub mod network;
pub mod trainer;
pub mod visualizer;

pub use activation::Activation;
pub use dataset::SampleSet;
pub use error::{Error, Result};
pub use features::{
    glyph_features, image_features, pixels_from_image, FeatureVector, GlyphRasterizer,
    FEATURE_LEN, FEATURE_SIDE,
};
pub use network::{NeuralNetwork, Prediction};
pub use trainer::{
    accuracy_report, train, train_and_save, EpochReport, SampleReport, TrainerConfig,
    TrainingOutcome,
};
