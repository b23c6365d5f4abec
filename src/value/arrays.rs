//! Прямоугольные массивы рангов 2, 3 и N.
//!
//! Ранг 1 — это обычный `Vec<T>` или `[T; N]`. Ранги 2 и 3 получают
//! специализированные типы с плотными построчными циклами; всё, что глубже,
//! уезжает в [`ArrayN`] — прямоугольный массив с динамическим числом
//! измерений и обходом по вектору индексов.
//!
//! На проводе: длины измерений (i32 каждая), затем все элементы построчно.

use super::containers::{read_count, write_count};
use super::Pack;
use crate::error::{CodecError, CodecResult};
use crate::stream::{StreamReader, StreamWriter};

/// Предел ранга [`ArrayN`].
const MAX_RANK: usize = 32;

fn shape_len(dims: &[usize]) -> CodecResult<usize> {
    dims.iter().try_fold(1usize, |acc, &d| {
        acc.checked_mul(d)
            .ok_or_else(|| CodecError::corrupted(format!("array shape {dims:?} overflows")))
    })
}

/// Двумерный прямоугольный массив, построчно.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array2<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Array2<T> {
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> CodecResult<Self> {
        if data.len() != shape_len(&[rows, cols])? {
            return Err(CodecError::corrupted(format!(
                "rank-2 array {rows}x{cols} expects {} elements, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

// Пустая форма 0x0, чтобы массив мог быть полем entry с `Default`.
impl<T> Default for Array2<T> {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }
}

impl<T: Pack> Pack for Array2<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.rows)?;
        write_count(w, self.cols)?;
        for item in &self.data {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let rows = read_count(r)?;
        let cols = read_count(r)?;
        let total = shape_len(&[rows, cols])?;
        let mut data = Vec::with_capacity(total);
        for _ in 0..total {
            data.push(T::unpack(r)?);
        }
        Ok(Self { rows, cols, data })
    }
}

/// Трёхмерный прямоугольный массив.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array3<T> {
    dim0: usize,
    dim1: usize,
    dim2: usize,
    data: Vec<T>,
}

impl<T> Array3<T> {
    pub fn new(dim0: usize, dim1: usize, dim2: usize, data: Vec<T>) -> CodecResult<Self> {
        if data.len() != shape_len(&[dim0, dim1, dim2])? {
            return Err(CodecError::corrupted(format!(
                "rank-3 array {dim0}x{dim1}x{dim2} expects {} elements, got {}",
                dim0 * dim1 * dim2,
                data.len()
            )));
        }
        Ok(Self {
            dim0,
            dim1,
            dim2,
            data,
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.dim0, self.dim1, self.dim2)
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<&T> {
        if i < self.dim0 && j < self.dim1 && k < self.dim2 {
            self.data.get((i * self.dim1 + j) * self.dim2 + k)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Default for Array3<T> {
    fn default() -> Self {
        Self {
            dim0: 0,
            dim1: 0,
            dim2: 0,
            data: Vec::new(),
        }
    }
}

impl<T: Pack> Pack for Array3<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.dim0)?;
        write_count(w, self.dim1)?;
        write_count(w, self.dim2)?;
        for item in &self.data {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let dim0 = read_count(r)?;
        let dim1 = read_count(r)?;
        let dim2 = read_count(r)?;
        let total = shape_len(&[dim0, dim1, dim2])?;
        let mut data = Vec::with_capacity(total);
        for _ in 0..total {
            data.push(T::unpack(r)?);
        }
        Ok(Self {
            dim0,
            dim1,
            dim2,
            data,
        })
    }
}

/// Прямоугольный массив произвольного ранга (обычно ≥ 4).
///
/// Хранение плоское, построчное; обход при кодировании идёт по вектору
/// индексов-«одометру», как и положено массиву с динамическим числом
/// измерений.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayN<T> {
    dims: Vec<usize>,
    data: Vec<T>,
}

impl<T> ArrayN<T> {
    pub fn new(dims: Vec<usize>, data: Vec<T>) -> CodecResult<Self> {
        if dims.is_empty() || dims.len() > MAX_RANK {
            return Err(CodecError::corrupted(format!(
                "array rank {} outside 1..={MAX_RANK}",
                dims.len()
            )));
        }
        if data.len() != shape_len(&dims)? {
            return Err(CodecError::corrupted(format!(
                "array of shape {dims:?} expects {} elements, got {}",
                shape_len(&dims)?,
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.flat_offset(index).and_then(|i| self.data.get(i))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn flat_offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0usize;
        for (&idx, &dim) in index.iter().zip(&self.dims) {
            if idx >= dim {
                return None;
            }
            offset = offset * dim + idx;
        }
        Some(offset)
    }

    /// Продвигает вектор индексов на одну позицию построчного порядка.
    /// Возвращает `false`, когда обход закончен.
    fn advance(index: &mut [usize], dims: &[usize]) -> bool {
        for axis in (0..dims.len()).rev() {
            index[axis] += 1;
            if index[axis] < dims[axis] {
                return true;
            }
            index[axis] = 0;
        }
        false
    }
}

// Пустая форма ранга 1 — минимальный допустимый ранг.
impl<T> Default for ArrayN<T> {
    fn default() -> Self {
        Self {
            dims: vec![0],
            data: Vec::new(),
        }
    }
}

impl<T: Pack> Pack for ArrayN<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.dims.len())?;
        for &dim in &self.dims {
            write_count(w, dim)?;
        }
        if self.data.is_empty() {
            return Ok(());
        }
        let mut index = vec![0usize; self.dims.len()];
        loop {
            let offset = self
                .flat_offset(&index)
                .ok_or_else(|| CodecError::corrupted("array index walk out of shape"))?;
            self.data[offset].pack(w)?;
            if !Self::advance(&mut index, &self.dims) {
                break;
            }
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let rank = read_count(r)?;
        if rank == 0 || rank > MAX_RANK {
            return Err(CodecError::corrupted(format!(
                "array rank {rank} outside 1..={MAX_RANK}"
            )));
        }
        let mut dims = Vec::with_capacity(rank);
        for _ in 0..rank {
            dims.push(read_count(r)?);
        }
        let total = shape_len(&dims)?;
        let mut data = Vec::with_capacity(total);
        if total > 0 {
            let mut index = vec![0usize; rank];
            loop {
                data.push(T::unpack(r)?);
                if !ArrayN::<T>::advance(&mut index, &dims) {
                    break;
                }
            }
        }
        Ok(Self { dims, data })
    }
}
