mod checkpoint;
mod config;
mod embeddings;
mod error;
mod files_handling;
mod pipeline;
mod similarity;
mod train;
mod vector;
mod vocab;

pub mod logging;

pub use checkpoint::{Progress, ProgressStore, EPOCH_FILE, LINE_FILE};
pub use config::{Config, LineSkip, RunParams, TrainParams};
pub use embeddings::{EmbeddingTable, Reconciliation, VECTORS_FILE};
pub use error::{EmbedError, Result};
pub use pipeline::Pipeline;
pub use similarity::Similarity;
pub use train::{train_line, Train, TrainState, TrainSummary};
pub use vector::{Operand, Vector};
pub use vocab::{Corpus, Tokenizer, Vocabulary};
