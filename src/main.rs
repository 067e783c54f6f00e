mod pretty;
mod summarize;
mod track;

use bpaf::Bpaf;

/// Streaming weighted mean and standard deviation
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
enum Subcommand {
    /// Summarize a CSV table from stdin, grouped by its first column
    #[bpaf(command)]
    Summarize {
        #[bpaf(external(summarize::options))]
        opts: summarize::Options,
    },
    /// Track a stream of observations from stdin, one per line
    #[bpaf(command)]
    Track {
        #[bpaf(external(track::options))]
        opts: track::Options,
    },
}

fn main() {
    env_logger::init();
    let result = match subcommand().run() {
        Subcommand::Summarize { opts } => summarize::summarize(opts),
        Subcommand::Track { opts } => track::track(opts),
    };
    match result {
        Ok(()) => (),
        Err(e) => {
            // Ignore EPIPE
            if let Some(e) = e.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    return;
                }
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(1)
        }
    }
}
