mod decode;
mod encode;
mod inspect;
mod serve;

/// Subcommands for pmeal
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Encode lines of text into token ids.
    Encode(encode::EncodeArgs),

    /// Decode lines of token ids into text.
    Decode(decode::DecodeArgs),

    /// Describe a vocabulary, optionally converting it to native JSON.
    Inspect(inspect::InspectArgs),

    /// Answer JSON tokenize requests, one per line.
    Serve(serve::ServeArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Encode(cmd) => cmd.run(),
            Commands::Decode(cmd) => cmd.run(),
            Commands::Inspect(cmd) => cmd.run(),
            Commands::Serve(cmd) => cmd.run(),
        }
    }
}
