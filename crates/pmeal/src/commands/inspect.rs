use std::io::Write;

use piecemeal::vocab::io::save_vocabulary_path;

use crate::{input_output::OutputArgs, vocab_args::VocabArgs};

/// Args for the inspect command.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    vocab: VocabArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Also save the validated vocabulary as native JSON.
    #[arg(long, default_value = None)]
    save: Option<String>,
}

impl InspectArgs {
    /// Run the inspect command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let vocab = self.vocab.load_vocab()?;
        let mut writer = self.output.open_writer()?;

        writeln!(writer, "model: {}", vocab.model())?;
        writeln!(writer, "entries: {}", vocab.len())?;
        writeln!(writer, "merges: {}", vocab.merges().len())?;
        writeln!(writer, "added tokens: {}", vocab.added_tokens().len())?;
        writeln!(writer, "normalizer: {:?}", vocab.normalizer_config())?;
        for (role, name) in vocab.special_names().named_roles() {
            let id = vocab.lookup(name).map_or("-".to_string(), |id| id.to_string());
            writeln!(writer, "{role}: {name} ({id})")?;
        }
        writer.flush()?;

        if let Some(path) = &self.save {
            save_vocabulary_path(&*vocab, path)?;
            log::info!("saved native vocabulary to {path}");
        }
        Ok(())
    }
}
