pub mod assign;
pub use assign::{assign, nearest_centroid};

pub mod backend;
pub use backend::{Backend, BackendKind, build_backend};

pub mod distance;
pub use distance::squared_distance;

pub mod driver;
pub use driver::{DEFAULT_ITERATIONS, KmeansOptions, kmeans, run};

pub mod error;
pub use error::{KmeansError, Result};

pub mod generate;

pub mod parse;

pub mod partition;
pub use partition::{partition_range, partition_ranges, split_table};

pub mod reduce;
pub use reduce::{Accumulator, EmptyClusterPolicy, reduce};

pub mod structs;
pub use structs::{Clustering, EmptyClusterEvent, Point, ReduceStats};
