use std::path::Path;

/// Answers whether an image file is still present on the device.
pub trait FileProbe: Send + Sync {
    fn file_exists(&self, path: &str) -> bool;
}

/// Checks the real filesystem. Directories do not count as images.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl FileProbe for LocalFiles {
    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}
