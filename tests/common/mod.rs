/*!
 * Common test utilities for the colloquial test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use colloquial::vocabulary::TermSpec;

/// An untagged transcript with voice spans
pub const PLAIN_VTT: &str = "WEBVTT

1
00:00:00.092 --> 00:00:10.681
<v Rukuwai> Ko Hohepa Tipene te kaikorero e whai ake nei.
He kaumatua no roto o Te Rārawa. I tupu ake i te reo o
te kainga.

2
00:00:10.681 --> 00:00:15.975
Nō hea tērā ingoa Panguru?</v>

3
00:00:15.975 --> 00:00:22.012
<v Hohepa>E pēnei pea tāku kōrero ki a koe.
";

/// `PLAIN_VTT` with every known term tagged
pub const TAGGED_VTT: &str = "WEBVTT

1
00:00:00.092 --> 00:00:10.681
<v Rukuwai> Ko <c.tangata>Hohepa Tipene</c> te kaikorero e whai ake nei.
He kaumatua no roto o <c.iwihapu>Te Rārawa</c>. I tupu ake i te reo o
te kainga.

2
00:00:10.681 --> 00:00:15.975
Nō hea tērā ingoa <c.kainga>Panguru</c>?</v>

3
00:00:15.975 --> 00:00:22.012
<v Hohepa>E pēnei pea tāku kōrero ki a koe.
";

/// Initialize env_logger once for tests that want log output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The terms tagged in `TAGGED_VTT`
pub fn sample_terms() -> Vec<TermSpec> {
    vec![
        TermSpec::new("Hohepa Tipene", "tangata"),
        TermSpec::new("Te Rārawa", "iwihapu"),
        TermSpec::new("Panguru", "kainga"),
    ]
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}
