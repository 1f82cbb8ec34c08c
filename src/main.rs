use deckhand::cli;
use deckhand::ui::output;

fn main() {
    match cli::run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            output::error(format!("{err:#}"));
            std::process::exit(1);
        }
    }
}
