use crate::domain::{
    DEFAULT_SORT_ARGS, HashAlgorithm, PipelineConfig, ProgressOptions, Resource, SortArgs,
};
use crate::error::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HashAlgorithmChoice {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    #[value(name = "sha3_224")]
    Sha3_224,
    #[value(name = "sha3_256")]
    Sha3_256,
    #[value(name = "sha3_384")]
    Sha3_384,
    #[value(name = "sha3_512")]
    Sha3_512,
    Blake2b,
    Blake2s,
    Blake3,
}

impl From<HashAlgorithmChoice> for HashAlgorithm {
    fn from(choice: HashAlgorithmChoice) -> Self {
        match choice {
            HashAlgorithmChoice::Md5 => HashAlgorithm::Md5,
            HashAlgorithmChoice::Sha1 => HashAlgorithm::Sha1,
            HashAlgorithmChoice::Sha224 => HashAlgorithm::Sha224,
            HashAlgorithmChoice::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmChoice::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmChoice::Sha512 => HashAlgorithm::Sha512,
            HashAlgorithmChoice::Sha3_224 => HashAlgorithm::Sha3_224,
            HashAlgorithmChoice::Sha3_256 => HashAlgorithm::Sha3_256,
            HashAlgorithmChoice::Sha3_384 => HashAlgorithm::Sha3_384,
            HashAlgorithmChoice::Sha3_512 => HashAlgorithm::Sha3_512,
            HashAlgorithmChoice::Blake2b => HashAlgorithm::Blake2b,
            HashAlgorithmChoice::Blake2s => HashAlgorithm::Blake2s,
            HashAlgorithmChoice::Blake3 => HashAlgorithm::Blake3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hashtree")]
#[command(about = "Generate hash digests for a list of files")]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    #[arg(help = "File list to read, or to write when finding files", default_value = "-")]
    pub infile: PathBuf,

    #[arg(help = "Where to write digest lines", default_value = "-")]
    pub outfile: PathBuf,

    #[arg(long = "help", action = ArgAction::Help, help = "Print help")]
    pub help: Option<bool>,

    #[arg(short = 'd', long = "debug", env = "HASHTREE_DEBUG", help = "Enable debug logging")]
    pub debug: bool,

    #[arg(
        short = 'h',
        long = "hash",
        env = "HASHTREE_HASH",
        help = "Checksum algorithm",
        value_enum,
        ignore_case = true,
        default_value = "sha256"
    )]
    pub hash: HashAlgorithmChoice,

    #[arg(
        short = 'p',
        long = "progress",
        env = "HASHTREE_PROGRESS",
        overrides_with = "no_progress",
        help = "Show the progress bar"
    )]
    pub progress: bool,

    #[arg(short = 'P', long = "no-progress", overrides_with = "progress", help = "Hide the progress bar")]
    pub no_progress: bool,

    #[arg(short = 'a', long = "ascii", env = "HASHTREE_ASCII", help = "Plain ASCII progress bar")]
    pub ascii: bool,

    #[arg(short = 'w', long = "width", env = "HASHTREE_WIDTH", help = "Progress bar width")]
    pub width: Option<u16>,

    #[arg(
        short = 'f',
        long = "find",
        env = "HASHTREE_FIND",
        default_value_t = true,
        overrides_with = "no_find",
        help = "Generate the file list with 'find'"
    )]
    pub find: bool,

    #[arg(short = 'F', long = "no-find", overrides_with = "find", help = "Read the file list from INFILE")]
    pub no_find: bool,

    #[arg(
        short = 's',
        long = "sort-files",
        env = "HASHTREE_SORT_FILES",
        default_value_t = true,
        overrides_with = "no_sort_files",
        help = "Sort the input or generated file list"
    )]
    pub sort_files: bool,

    #[arg(short = 'S', long = "no-sort-files", overrides_with = "sort_files", help = "Keep the file list order")]
    pub no_sort_files: bool,

    #[arg(
        short = 'o',
        long = "sort-output",
        env = "HASHTREE_SORT_OUTPUT",
        overrides_with = "no_sort_output",
        help = "Sort the output with 'sort'"
    )]
    pub sort_output: bool,

    #[arg(short = 'O', long = "no-sort-output", overrides_with = "sort_output", help = "Keep the output order")]
    pub no_sort_output: bool,

    #[arg(
        short = 'k',
        long = "sort-args",
        env = "HASHTREE_SORT_ARGS",
        default_value = DEFAULT_SORT_ARGS,
        allow_hyphen_values = true,
        help = "Arguments passed to 'sort'"
    )]
    pub sort_args: String,

    #[arg(
        short = 'b',
        long = "base-dir",
        env = "HASHTREE_BASE_DIR",
        default_value = ".",
        help = "Base directory for the file list"
    )]
    pub base_dir: PathBuf,

    #[arg(
        short = 't',
        long = "temp-dir",
        env = "HASHTREE_TEMP_DIR",
        default_value = ".",
        help = "Directory for spool files"
    )]
    pub temp_dir: PathBuf,
}

impl Cli {
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let progress = if self.no_progress {
            Some(false)
        } else if self.progress {
            Some(true)
        } else {
            None
        };

        let mut config = PipelineConfig::new()
            .with_base_dir(&self.base_dir)
            .with_input(Resource::from(self.infile.clone()))
            .with_output(Resource::from(self.outfile.clone()))
            .with_algorithm(self.hash.into())
            .with_find(self.find && !self.no_find)
            .with_sort_files(self.sort_files && !self.no_sort_files)
            .with_sort_output(self.sort_output && !self.no_sort_output)
            .with_sort_args(self.sort_args.parse::<SortArgs>()?)
            .with_progress(progress)
            .with_temp_dir(&self.temp_dir);

        config.progress_options = ProgressOptions {
            ascii: self.ascii,
            width: self.width,
        };

        Ok(config)
    }
}
