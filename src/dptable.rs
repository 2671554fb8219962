/// A dense dynamic programming table, indexed by (row, column, state).
/// It is a serialized 3-d array, owned by a single DP invocation.
#[derive(Debug, Clone)]
pub struct DPTable<T> {
    // Total memory
    mem: Vec<T>,
    column: usize,
    row: usize,
    states: usize,
}

impl<T: Copy> DPTable<T> {
    /// Allocate a `row` x `column` x `states` table, each cell filled by `fill`.
    pub fn new(row: usize, column: usize, states: usize, fill: T) -> Self {
        Self {
            mem: vec![fill; row * column * states],
            column,
            row,
            states,
        }
    }
    fn offset(&self, i: usize, j: usize, s: usize) -> usize {
        debug_assert!(i < self.row && j < self.column && s < self.states);
        (i * self.column + j) * self.states + s
    }
    pub fn get(&self, i: usize, j: usize, s: usize) -> T {
        self.mem[self.offset(i, j, s)]
    }
    pub fn get_mut(&mut self, i: usize, j: usize, s: usize) -> &mut T {
        let offset = self.offset(i, j, s);
        &mut self.mem[offset]
    }
    pub fn set(&mut self, i: usize, j: usize, s: usize, target: T) {
        *self.get_mut(i, j, s) = target;
    }
    // All the states in the [i][j] cell.
    pub fn get_cell(&self, i: usize, j: usize) -> &[T] {
        let start = self.offset(i, j, 0);
        &self.mem[start..start + self.states]
    }
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.row, self.column, self.states)
    }
}
