pub mod backprop;
pub mod checkpoint;
pub mod gradients;
pub mod network;
pub mod output;
pub mod spec;
pub mod topology;

pub use checkpoint::CheckpointFormat;
pub use gradients::Gradients;
pub use network::{ForwardTrace, Network};
pub use output::{Linear, OutputMode, ReferenceSoftmax, Softmax};
pub use spec::NetworkSpec;
pub use topology::Topology;
