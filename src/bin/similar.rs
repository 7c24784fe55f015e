use std::{env, fs::File, io::{self, BufRead}, path::Path, process};
use window_embed::{logging, EmbedError, EmbeddingTable, Similarity};


// checks on trained vectors: the K most similar words to a given word, and
// the K most similar words to an analogy of three words.
// treated as binary executable so it can be ran independently from main

fn main() {

    logging::init();

    // arguments to this executable should be:
    // path to trained vectors (json)
    // path to a queries file, one query per line:
    //   "word"               -> most similar words
    //   "a b c" or "a b c d" -> a is to b as c is to ? (d is the expected answer)
    // optional number of results, 10 by default
    // example: ... output/vectors.json queries.txt 5
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: {} <vectors.json> <queries.txt> [k]", args[0]);
        process::exit(2);
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), EmbedError> {

    let k = match args.get(3) {
        Some(k) => k.parse::<usize>().map_err(|e| EmbedError::Config(format!("k must be a positive integer: {}", e)))?,
        None => 10,
    };

    let table = EmbeddingTable::load(Path::new(&args[1]))?
        .ok_or_else(|| EmbedError::Config(format!("no vectors found in {}", args[1])))?;
    let similarity = Similarity::new(&table);

    let lines = io::BufReader::new(File::open(&args[2])?).lines();
    for line in lines {
        let line = line?;
        let query: Vec<&str> = line.split_whitespace().collect();

        let outcome = match query.as_slice() {
            [] => continue,
            [token] => run_similarity(token, k, &similarity),
            [a, b, c] => run_analogy([*a, *b, *c], None, k, &similarity),
            [a, b, c, d] => run_analogy([*a, *b, *c], Some(*d), k, &similarity),
            _ => {
                log::warn!("skipping query with {} words: '{}'", query.len(), line);
                continue;
            }
        };

        // a word missing from the vectors only spoils its own query
        match outcome {
            Err(EmbedError::UnknownWord(word)) => log::warn!("'{}' has no vector, skipping '{}'", word, line),
            other => other?,
        }
        println!();
    }

    Ok(())
}

fn run_analogy(source: [&str; 3], target: Option<&str>, k: usize, similarity: &Similarity) -> Result<(), EmbedError> {

    // a is to b as like c is to ?
    // translates to b - a + c : ?
    let analogies = similarity.extract_analogies(source, k)?;
    let mut found_target = false;
    for (i, (analogy, score)) in analogies.iter().enumerate() {
        println!("{} : {} - {} + {} ? {} = {}", i, source[1], source[0], source[2], analogy, score);
        if Some(analogy.as_str()) == target {
            found_target = true;
            println!("found target '{}' analogy in place {}", analogy, 1 + i);
        }
    }

    if let (Some(target), false) = (target, found_target) {
        println!("target '{}' was not found within the first {} analogies", target, k);
    }
    Ok(())
}

fn run_similarity(token: &str, k: usize, similarity: &Similarity) -> Result<(), EmbedError> {

    println!("searching {} most similar words to {}", k, token);
    for (i, (similar_token, score)) in similarity.most_similar(token, k)?.iter().enumerate() {
        println!("{} : {} ? {} = {}", i, token, similar_token, score);
    }
    Ok(())
}
