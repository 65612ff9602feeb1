use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub const ARG_QUIZ_CATALOG: &str = "quiz-catalog";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_QUIZ_CATALOG)
            .long(ARG_QUIZ_CATALOG)
            .help("Path to a JSON quiz catalog (default: built-in catalog)")
            .env("QUIZGATE_QUIZ_CATALOG")
            .value_parser(clap::value_parser!(PathBuf)),
    )
}

#[must_use]
pub fn catalog_path(matches: &ArgMatches) -> Option<PathBuf> {
    matches.get_one::<PathBuf>(ARG_QUIZ_CATALOG).cloned()
}
