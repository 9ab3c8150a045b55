use std::{io::Write, num::NonZeroUsize};

use piecemeal::{
    encoders::{EncodeOptions, PaddingStrategy},
    serving::{ServingAdapter, ServingOptions},
};

use crate::{
    input_output::{InputArgs, OutputArgs, for_each_line},
    vocab_args::TokenizerArgs,
};

/// Args for the serve command.
///
/// Each input line is one JSON tokenize request; each output line is
/// ``{"status": <code>, "body": <response>}``.
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Maximum concurrent calls; defaults to a multiple of the thread count.
    #[arg(long, default_value = None)]
    max_in_flight: Option<NonZeroUsize>,

    /// Default padding for batch requests.
    #[arg(long, default_value = "longest")]
    padding: PaddingStrategy,
}

impl ServeArgs {
    /// Run the serve command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let tokenizer = self.tokenizer.load_tokenizer()?;
        let options = ServingOptions::default()
            .with_encode(EncodeOptions::default().with_padding(self.padding))
            .with_max_in_flight(self.max_in_flight);
        let adapter = ServingAdapter::new(tokenizer, options);

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        for_each_line(&mut *reader, |line| {
            if line.trim().is_empty() {
                return Ok(());
            }
            let response = adapter.handle_json(line.as_bytes());
            let body: serde_json::Value = serde_json::from_slice(&response.body)?;
            let envelope = serde_json::json!({
                "status": response.status,
                "body": body,
            });
            serde_json::to_writer(&mut *writer, &envelope)?;
            writeln!(writer)?;
            writer.flush()?;
            Ok(())
        })
    }
}
