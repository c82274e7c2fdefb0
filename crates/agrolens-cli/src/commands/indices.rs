use agrolens_core::indices::VegetationIndex;
use anyhow::Result;
use clap::Args;

use crate::summary::print_index_catalog;

#[derive(Args)]
pub struct IndicesArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &IndicesArgs) -> Result<()> {
    let catalog: Vec<_> = VegetationIndex::ALL.iter().map(|i| i.info()).collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print_index_catalog(&catalog);
    }
    Ok(())
}
