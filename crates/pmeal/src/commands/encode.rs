use std::io::Write;

use piecemeal::encoders::{EncodeOptions, EncodedExample, TokenEncoder};

use crate::{
    input_output::{InputArgs, OutputArgs, for_each_line},
    vocab_args::TokenizerArgs,
};

/// Args for the encode command.
#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Do not frame rows with the start and end tokens.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_special_tokens: bool,

    /// Maximum row length, including special tokens; 0 disables truncation.
    #[arg(long, default_value_t = piecemeal::encoders::DEFAULT_MAX_LENGTH)]
    max_length: usize,

    /// Emit one JSON object per line, with offsets and masks.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl EncodeArgs {
    fn encode_options(&self) -> EncodeOptions {
        let options = EncodeOptions::default().with_add_special_tokens(!self.no_special_tokens);
        match self.max_length {
            0 => options.with_truncation(false).with_max_length(None),
            n => options.with_max_length(n),
        }
    }

    /// Run the encode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let tokenizer = self.tokenizer.load_tokenizer()?;
        let options = self.encode_options();
        options.validate()?;

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        for_each_line(&mut *reader, |line| {
            let batch = tokenizer.try_encode_batch(&[line.to_string()], &options)?;
            for row in batch.iter() {
                write_row(&mut *writer, row, self.json)?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

fn write_row(
    writer: &mut dyn Write,
    row: &EncodedExample<u32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let offsets: Vec<[usize; 2]> = row.offsets.iter().map(|r| [r.start, r.end]).collect();
        let value = serde_json::json!({
            "input_ids": row.ids,
            "attention_mask": row.attention_mask,
            "special_tokens_mask": row.special_tokens_mask,
            "offsets": offsets,
        });
        serde_json::to_writer(&mut *writer, &value)?;
    } else {
        for (idx, token) in row.ids.iter().enumerate() {
            write!(writer, "{}{}", if idx == 0 { "" } else { " " }, token)?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Args, commands::Commands};

    fn encode_args(argv: &[&str]) -> super::EncodeArgs {
        let mut full = vec!["pmeal", "encode", "--vocab", "vocab.txt"];
        full.extend_from_slice(argv);
        match Args::try_parse_from(full).unwrap().command {
            Commands::Encode(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_encode_options() {
        let opts = encode_args(&[]).encode_options();
        assert!(opts.add_special_tokens());
        assert_eq!(opts.max_length(), Some(512));
        assert!(opts.validate().is_ok());

        let opts = encode_args(&["--max-length", "0", "--no-special-tokens"]).encode_options();
        assert!(!opts.truncation());
        assert!(!opts.add_special_tokens());
        assert_eq!(opts.max_length(), None);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_line_reader() {
        let mut lines = Vec::new();
        let mut reader: &[u8] = b"one\r\ntwo\n\nthree";
        crate::input_output::for_each_line(&mut reader, |line| {
            lines.push(line.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }
}
