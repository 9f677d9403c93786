use camino::Utf8PathBuf;
use clap::Parser;
use f1db::Result;
use ohno::bail;

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Directory the tables would be created in
    #[arg(long, short = 'd', value_name = "PATH")]
    pub directory: Utf8PathBuf,
}

pub fn create(args: &CreateArgs) -> Result<()> {
    bail!("create is not implemented (requested for '{}')", args.directory)
}
