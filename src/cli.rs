use std::path::PathBuf;

use clap::Parser;

use crate::route::Route;

#[derive(Parser, Debug)]
#[command(name = "watchlog", version, about = "Track the movies and series you watch")]
pub struct Args {
    /// Page to open, e.g. "friends" or "entry/12"
    #[arg(short, long)]
    pub page: Option<Route>,

    /// Library snapshot file to read and write
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Alternative configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed an empty library with demo data
    #[arg(long)]
    pub demo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryId;

    #[test]
    fn parses_page_and_flags() {
        let args = Args::parse_from(["watchlog", "--page", "entry/3", "--demo"]);
        assert_eq!(args.page, Some(Route::Entry(EntryId::new(3))));
        assert!(args.demo);
        assert!(args.data_file.is_none());
    }

    #[test]
    fn rejects_unknown_page() {
        assert!(Args::try_parse_from(["watchlog", "--page", "settings"]).is_err());
    }
}
