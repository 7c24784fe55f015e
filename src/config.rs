use crate::error::{EmbedError, Result};

use serde_json::Value;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::str::FromStr;


/// Which epochs honour the line index read at start-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineSkip {
    /// Every epoch of the run skips the resumed line count, not only the
    /// epoch that was interrupted.
    EveryEpoch,
    /// Only the interrupted epoch skips lines; later epochs start at line 0.
    ResumedEpochOnly,
}

impl FromStr for LineSkip {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "every_epoch" => Ok(LineSkip::EveryEpoch),
            "resumed_epoch" => Ok(LineSkip::ResumedEpochOnly),
            other => Err(EmbedError::Config(format!("unknown line_skip '{}', expected 'every_epoch' or 'resumed_epoch'", other))),
        }
    }
}

impl Display for LineSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineSkip::EveryEpoch => write!(f, "every_epoch"),
            LineSkip::ResumedEpochOnly => write!(f, "resumed_epoch"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrainParams {
    pub window_size: usize,
    pub vector_size: usize,
    pub learning_rate: f32,
    pub epochs: usize,
    pub save_every: usize,
    pub line_skip: LineSkip,
    pub seed: Option<u64>,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            window_size: 2,
            vector_size: 100,
            learning_rate: 0.025,
            epochs: 10,
            save_every: 1,
            line_skip: LineSkip::EveryEpoch,
            seed: None,
        }
    }
}

impl Display for TrainParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        window_size: {},
        vector_size: {},
        learning_rate: {},
        epochs: {},
        save_every: {},
        line_skip: {},
        seed: {:?}",
        self.window_size, self.vector_size, self.learning_rate, self.epochs, self.save_every, self.line_skip, self.seed
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunParams {
    pub corpus_file: PathBuf,
    pub output_dir: PathBuf,
    pub train: TrainParams,
}

impl Display for RunParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        Using {}",
        self.corpus_file.display(), self.output_dir.display(), self.train)
    }
}

pub struct Config {
    params: RunParams
}

impl Config {

    pub fn get_params(&self) -> RunParams {
        self.params.clone()
    }

    /// Expects the program name followed by a single path to a json file.
    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(EmbedError::Config("input should be a path to json file only".to_string()));
        }

        // parse input json
        let f = File::open(&args[1])
            .map_err(|e| EmbedError::Config(format!("cannot open json file {}: {}", args[1], e)))?;
        let json: Value = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| EmbedError::Config(format!("cannot read json file {}: {}", args[1], e)))?;

        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        // validate input and output in json
        let corpus_file = required_str(json, "corpus_file")?;
        let output_dir = required_str(json, "output_dir")?;

        // handle default vs input parameters
        let defaults = TrainParams::default();
        let train = TrainParams {
            window_size: optional_usize(json, "window_size", defaults.window_size)?,
            vector_size: optional_usize(json, "vector_size", defaults.vector_size)?,
            learning_rate: match json.get("learning_rate") {
                Some(v) => v.as_f64().ok_or_else(|| not_a("learning_rate", "number"))? as f32,
                None => defaults.learning_rate,
            },
            epochs: optional_usize(json, "epochs", defaults.epochs)?,
            save_every: optional_usize(json, "save_every", defaults.save_every)?,
            line_skip: match json.get("line_skip") {
                Some(v) => v.as_str().ok_or_else(|| not_a("line_skip", "string"))?.parse()?,
                None => defaults.line_skip,
            },
            seed: match json.get("seed") {
                Some(v) => Some(v.as_u64().ok_or_else(|| not_a("seed", "non-negative integer"))?),
                None => None,
            },
        };

        for (key, value) in [("vector_size", train.vector_size), ("epochs", train.epochs), ("save_every", train.save_every)] {
            if value == 0 {
                return Err(EmbedError::Config(format!("{} must be positive", key)));
            }
        }
        if !train.learning_rate.is_finite() || train.learning_rate <= 0.0 {
            return Err(EmbedError::Config("learning_rate must be a positive number".to_string()));
        }

        Ok(Self {
            params: RunParams {
                corpus_file: PathBuf::from(corpus_file),
                output_dir: PathBuf::from(output_dir),
                train,
            }
        })
    }
}

fn not_a(key: &str, kind: &str) -> EmbedError {
    EmbedError::Config(format!("given {} is not a {}", key, kind))
}

fn required_str<'a>(json: &'a Value, key: &str) -> Result<&'a str> {
    json.get(key)
        .ok_or_else(|| EmbedError::Config(format!("{} was not supplied through json", key)))?
        .as_str()
        .ok_or_else(|| not_a(key, "string"))
}

fn optional_usize(json: &Value, key: &str, default: usize) -> Result<usize> {
    match json.get(key) {
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| not_a(key, "non-negative integer")),
        None => Ok(default),
    }
}
