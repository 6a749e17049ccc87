use crate::domain::ports::Storage;
use crate::utils::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

/// Split `samples` into contiguous chunks of `batch_size`; only the last
/// chunk may be shorter.
pub fn split_samples<T: Clone>(samples: &[T], batch_size: usize) -> Result<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(PipelineError::invalid_input(
            "sub-batch size must be a positive integer",
        ));
    }
    Ok(samples.chunks(batch_size).map(<[T]>::to_vec).collect())
}

/// `sub_batch_001`, `sub_batch_002`, ... padded to at least three digits, or
/// wider when there are more than 999 chunks so names still sort lexically.
pub fn sub_batch_name(index: usize, total: usize) -> String {
    let width = total.to_string().len().max(3);
    format!("sub_batch_{:0width$}", index, width = width)
}

/// Non-blank, trimmed lines of a sample (`.fam`) file.
pub fn read_samples<S: Storage>(storage: &S, fam_path: &Path) -> Result<Vec<String>> {
    let content = storage.read_to_string(fam_path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Split a sample file into `output_dir/sub_batch_NNN.fam` files and return
/// their paths in order. Existing files with the same names are overwritten.
pub fn split_fam<S: Storage>(
    storage: &S,
    fam_path: &Path,
    output_dir: &Path,
    batch_size: usize,
) -> Result<Vec<PathBuf>> {
    let samples = read_samples(storage, fam_path)?;
    let chunks = split_samples(&samples, batch_size)?;
    storage.create_dir_all(output_dir)?;

    let mut paths = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let path = output_dir.join(format!("{}.fam", sub_batch_name(i + 1, chunks.len())));
        let mut content = chunk.join("\n");
        content.push('\n');
        storage.write_file(&path, content.as_bytes())?;
        paths.push(path);
    }

    tracing::info!(
        "✂️ Split {} samples from {} into {} sub-batches of up to {}",
        samples.len(),
        fam_path.display(),
        paths.len(),
        batch_size
    );
    Ok(paths)
}
