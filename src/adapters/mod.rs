pub mod external;
pub mod line_reader;
pub mod multi_hasher;
pub mod progress;
pub mod spool;
pub mod stdio;

pub use external::{FindDiscovery, SystemSort};
pub use line_reader::{LineReader, ProgressReader};
pub use multi_hasher::MultiAlgorithmHasher;
pub use progress::ProgressBarAdapter;
pub use spool::{SpoolFile, SpoolRegistry, Tracked};
pub use stdio::{InputStream, OutputStream, ScopedIo};
