//! Conversions between host values and linear-memory layouts.
//!
//! Writing into module memory goes through [`Scope`](crate::Scope)
//! (`alloc_text`, `alloc_bytes`) so the backing buffers are tracked.
//! Reading the finished symbol back out does not allocate: it walks
//! the module's accessor calls and copies every cell into an owned
//! [`Matrix`] while the producing scope is still open.

use qrbind_core::{EncodeError, Matrix, ModuleSurface};

/// Read the symbol at `result` back into an owned [`Matrix`].
///
/// One `matrix_size` call, then one `matrix_cell` call per cell in
/// row-major order, O(size²) boundary calls, bounded by 177² for the
/// largest symbol. Must be called before the scope owning `result`
/// closes; the returned matrix has no further relationship to module
/// memory.
pub fn read_matrix(surface: &dyn ModuleSurface, result: u32) -> Result<Matrix, EncodeError> {
    let size = surface.matrix_size(result)? as usize;
    let mut cells = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            cells.push(u8::from(surface.matrix_cell(result, x as u32, y as u32)?));
        }
    }
    Ok(Matrix::from_cells(size, cells))
}
