//! ImageStag Edit
//!
//! Pixel transformation engine with a persistent undo/redo history,
//! implemented in Rust with optional Python bindings via PyO3 and WASM
//! bindings for JavaScript.
//!
//! ## Image Format
//! Every operation works on a [`PixelBuffer`], an 8-bit image with one of
//! three channel layouts:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Operations never modify their input; each returns a new buffer. Alpha is
//! carried through untouched. Operations that are inherently single-channel
//! (histogram, bit planes, pseudocolor) first reduce color input to
//! intensity with [`PixelBuffer::to_intensity`].
//!
//! ## Layout
//! - [`filters`] - point transforms, histograms, bit planes, spatial filters,
//!   Laplacian, pseudocolor and inspection helpers
//! - [`history`] - snapshot list with cursor, persisted under an explicit root
//! - [`config`] - JSON-loadable engine options
//!
//! ## Logging
//! All operations emit `tracing` events; install a subscriber in the host
//! application to see them.

pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::{ChannelMode, LumaWeights, PixelBuffer};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use history::{HistoryConfig, HistoryItem, HistoryManager};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::path::PathBuf;

    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyIOError, PyValueError};
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::error::Error;
    use crate::filters::{bit_plane, edge, histogram, point, pseudocolor, spatial};
    use crate::history::{HistoryConfig, HistoryManager};

    impl From<Error> for PyErr {
        fn from(err: Error) -> PyErr {
            if err.is_storage() {
                PyIOError::new_err(err.to_string())
            } else {
                PyValueError::new_err(err.to_string())
            }
        }
    }

    fn to_buffer(image: PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        Ok(PixelBuffer::from_array(image.as_array().to_owned())?)
    }

    fn to_py<'py>(py: Python<'py>, buffer: PixelBuffer) -> Bound<'py, PyArray3<u8>> {
        buffer.into_array().into_pyarray(py)
    }

    // ========================================================================
    // Point Transforms
    // ========================================================================

    #[pyfunction]
    pub fn negative<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, point::negative(&input)))
    }

    #[pyfunction]
    pub fn zero_intensity<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, point::zero_intensity(&input)))
    }

    #[pyfunction]
    #[pyo3(signature = (image, gamma, c=1.0))]
    pub fn power_transform<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        gamma: f64,
        c: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, point::power_transform(&input, gamma, c)?))
    }

    #[pyfunction]
    pub fn contrast_stretch<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        r1: u8,
        s1: u8,
        r2: u8,
        s2: u8,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, point::contrast_stretch(&input, r1, s1, r2, s2)?))
    }

    // ========================================================================
    // Histogram
    // ========================================================================

    /// Returns `(counts, normalized)`, 256 entries each.
    #[pyfunction]
    pub fn compute_histogram(image: PyReadonlyArray3<'_, u8>) -> PyResult<(Vec<u64>, Vec<f64>)> {
        let input = to_buffer(image)?;
        let hist = histogram::compute_histogram(&input);
        Ok((hist.counts().to_vec(), hist.normalized().to_vec()))
    }

    /// Returns `(image, original_counts, equalized_counts)`.
    #[pyfunction]
    pub fn equalize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<(Bound<'py, PyArray3<u8>>, Vec<u64>, Vec<u64>)> {
        let input = to_buffer(image)?;
        let eq = histogram::equalize(&input);
        Ok((
            to_py(py, eq.image),
            eq.original.counts().to_vec(),
            eq.equalized.counts().to_vec(),
        ))
    }

    // ========================================================================
    // Bit Planes
    // ========================================================================

    /// Returns `(depth, max_intensity)`.
    #[pyfunction]
    pub fn infer_bit_depth(image: PyReadonlyArray3<'_, u8>) -> PyResult<(u32, u8)> {
        let input = to_buffer(image)?;
        let depth = bit_plane::infer_bit_depth(&input);
        Ok((depth.depth, depth.max_intensity))
    }

    #[pyfunction]
    pub fn extract_bit_plane<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        plane: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, bit_plane::extract_plane(&input, plane)?))
    }

    #[pyfunction]
    pub fn reconstruct_from_planes<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        planes: Vec<u32>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, bit_plane::reconstruct_from_planes(&input, &planes)?))
    }

    // ========================================================================
    // Spatial Filters
    // ========================================================================

    #[pyfunction]
    pub fn mean_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, spatial::mean_filter(&input, kernel_size)?))
    }

    #[pyfunction]
    pub fn min_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, spatial::min_filter(&input, kernel_size)?))
    }

    #[pyfunction]
    pub fn max_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, spatial::max_filter(&input, kernel_size)?))
    }

    #[pyfunction]
    pub fn median_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, spatial::median_filter(&input, kernel_size)?))
    }

    #[pyfunction]
    #[pyo3(signature = (image, include_diagonals=true, apply_adjustment=false, sharpen=false))]
    pub fn laplacian<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        include_diagonals: bool,
        apply_adjustment: bool,
        sharpen: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, edge::laplacian(&input, include_diagonals, apply_adjustment, sharpen)))
    }

    // ========================================================================
    // Pseudocolor
    // ========================================================================

    #[pyfunction]
    pub fn intensity_slicing<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        thresholds: Vec<u8>,
        colors: Vec<(u8, u8, u8)>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        let colors: Vec<pseudocolor::Rgb> = colors.into_iter().map(|(r, g, b)| [r, g, b]).collect();
        Ok(to_py(py, pseudocolor::intensity_slicing(&input, &thresholds, &colors)?))
    }

    #[pyfunction]
    pub fn slice_preset<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, pseudocolor::apply_slice_preset(&input, name)?))
    }

    #[pyfunction]
    pub fn channel_preset<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = to_buffer(image)?;
        Ok(to_py(py, pseudocolor::apply_channel_preset(&input, name)?))
    }

    // ========================================================================
    // History
    // ========================================================================

    #[pyclass(name = "HistoryManager", unsendable)]
    pub struct PyHistoryManager {
        inner: HistoryManager,
    }

    #[pymethods]
    impl PyHistoryManager {
        #[new]
        #[pyo3(signature = (root, max_items=None))]
        fn new(root: PathBuf, max_items: Option<usize>) -> Self {
            let config = HistoryConfig { root, max_items };
            PyHistoryManager {
                inner: HistoryManager::open(config),
            }
        }

        fn add_item(&mut self, image: PyReadonlyArray3<'_, u8>, description: &str) -> PyResult<usize> {
            let buffer = to_buffer(image)?;
            Ok(self.inner.add_item(buffer, description)?)
        }

        fn go_to(&mut self, index: usize) -> PyResult<()> {
            Ok(self.inner.go_to(index)?)
        }

        fn undo(&mut self) -> PyResult<bool> {
            Ok(self.inner.undo()?)
        }

        fn redo(&mut self) -> PyResult<bool> {
            Ok(self.inner.redo()?)
        }

        fn clear(&mut self) -> PyResult<()> {
            Ok(self.inner.clear()?)
        }

        fn current_image<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<u8>>> {
            self.inner.current_image().map(|buffer| to_py(py, buffer))
        }

        /// -1 when the history is empty.
        #[getter]
        fn current_index(&self) -> i64 {
            self.inner.current_index().map_or(-1, |i| i as i64)
        }

        fn descriptions(&self) -> Vec<String> {
            self.inner
                .items()
                .iter()
                .map(|item| item.description().to_string())
                .collect()
        }

        fn __len__(&self) -> usize {
            self.inner.len()
        }
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    #[pymodule]
    pub fn imagestag_edit(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Point transforms
        m.add_function(wrap_pyfunction!(negative, m)?)?;
        m.add_function(wrap_pyfunction!(zero_intensity, m)?)?;
        m.add_function(wrap_pyfunction!(power_transform, m)?)?;
        m.add_function(wrap_pyfunction!(contrast_stretch, m)?)?;

        // Histogram
        m.add_function(wrap_pyfunction!(compute_histogram, m)?)?;
        m.add_function(wrap_pyfunction!(equalize, m)?)?;

        // Bit planes
        m.add_function(wrap_pyfunction!(infer_bit_depth, m)?)?;
        m.add_function(wrap_pyfunction!(extract_bit_plane, m)?)?;
        m.add_function(wrap_pyfunction!(reconstruct_from_planes, m)?)?;

        // Spatial filters
        m.add_function(wrap_pyfunction!(mean_filter, m)?)?;
        m.add_function(wrap_pyfunction!(min_filter, m)?)?;
        m.add_function(wrap_pyfunction!(max_filter, m)?)?;
        m.add_function(wrap_pyfunction!(median_filter, m)?)?;
        m.add_function(wrap_pyfunction!(laplacian, m)?)?;

        // Pseudocolor
        m.add_function(wrap_pyfunction!(intensity_slicing, m)?)?;
        m.add_function(wrap_pyfunction!(slice_preset, m)?)?;
        m.add_function(wrap_pyfunction!(channel_preset, m)?)?;

        m.add_class::<PyHistoryManager>()?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imagestag_edit;
