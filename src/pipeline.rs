// imports
use crate::config::{Config, RunParams};
use crate::embeddings::{EmbeddingTable, VECTORS_FILE};
use crate::error::Result;
use crate::train::{Train, TrainSummary};
use crate::vocab::{Corpus, Vocabulary};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::time::Instant;

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> configuration of arguments
    // -> vocabulary building and vectors loading (or creation)
    // -> training

    pub fn run() -> Result<TrainSummary> {

        log::info!("entering program...");
        let args: Vec<String> = env::args().collect();

        log::info!("building parameters...");
        let params = Config::new(&args)?.get_params();
        log::info!("{}", params);

        Pipeline::run_with(&params)
    }

    pub fn run_with(params: &RunParams) -> Result<TrainSummary> {

        let timer = Instant::now();
        let corpus = Corpus::from_file(&params.corpus_file);

        log::info!("starting vocab building...");
        let vocab = Vocabulary::build(&corpus)?;
        log::info!("found {} distinct tokens, took {} ms", vocab.len(), timer.elapsed().as_millis());

        let mut rng = match params.train.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // vectors from an earlier (possibly interrupted) run take precedence
        let vectors_path = params.output_dir.join(VECTORS_FILE);
        let mut table = match EmbeddingTable::load(&vectors_path)? {
            Some(mut table) => {
                log::info!("loaded {} vectors from {}", table.len(), vectors_path.display());
                table.reconcile(&vocab, params.train.vector_size, &mut rng);
                table
            }
            None => EmbeddingTable::create_using(&vocab, params.train.vector_size, &mut rng),
        };

        // run training part
        let timer = Instant::now();
        log::info!("starting training part...");
        let mut trainer = Train::new(params.train.clone(), &params.output_dir);
        let summary = trainer.train(&corpus, &mut table)?;

        log::info!("finished training over {} lines, saved vecs. Took {} seconds ...", summary.lines_processed, timer.elapsed().as_secs());
        Ok(summary)
    }

}
