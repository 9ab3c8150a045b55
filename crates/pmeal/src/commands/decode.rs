use std::io::Write;

use piecemeal::{
    TokenizerOptions,
    decoders::{DecodeOptions, TokenDecoder},
};

use crate::{
    input_output::{InputArgs, OutputArgs, for_each_line},
    vocab_args::VocabArgs,
};

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    vocab: VocabArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Keep special tokens in the decoded text.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    keep_special_tokens: bool,

    /// Do not remove spaces before punctuation and contractions.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_cleanup: bool,
}

impl DecodeArgs {
    /// Run the decode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let decode_options = DecodeOptions::default()
            .with_skip_special_tokens(!self.keep_special_tokens)
            .with_cleanup_tokenization_spaces(!self.no_cleanup);
        let tokenizer = TokenizerOptions::default()
            .with_parallel(false)
            .with_decoder(decode_options)
            .build(self.vocab.load_vocab()?)?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        for_each_line(&mut *reader, |line| {
            let tokens = line
                .split_whitespace()
                .map(|s| s.parse::<u32>())
                .collect::<Result<Vec<u32>, _>>()?;

            let text = tokenizer.try_decode_to_string(&tokens)?.try_result()?;

            writeln!(writer, "{text}")?;
            writer.flush()?;
            Ok(())
        })
    }
}
