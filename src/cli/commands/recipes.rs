use clap::{Arg, Command};

pub const ARG_MIN_INSTRUCTIONS_LENGTH: &str = "min-instructions-length";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_MIN_INSTRUCTIONS_LENGTH)
            .long(ARG_MIN_INSTRUCTIONS_LENGTH)
            .help("Minimum number of characters in recipe instructions")
            .env("RECIPEBOX_MIN_INSTRUCTIONS_LENGTH")
            .default_value("20")
            .value_parser(clap::value_parser!(usize)),
    )
}
