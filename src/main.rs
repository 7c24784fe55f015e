use window_embed::{logging, Pipeline};

fn main() {
    logging::init();

    if let Err(e) = Pipeline::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
