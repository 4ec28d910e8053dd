/// Number of joint parent states, or `None` on overflow. No parents means one column.
pub fn column_count(radices: &[usize]) -> Option<usize> {
    radices
        .iter()
        .try_fold(1usize, |acc, &radix| acc.checked_mul(radix))
}

/// Mixed-radix column index for `digits`; the last parent varies fastest.
pub fn column_index(radices: &[usize], digits: &[usize]) -> Option<usize> {
    if radices.len() != digits.len() {
        return None;
    }
    let mut index = 0usize;
    for (&radix, &digit) in radices.iter().zip(digits) {
        if digit >= radix {
            return None;
        }
        index = index.checked_mul(radix)?.checked_add(digit)?;
    }
    Some(index)
}

/// Cursor over every joint parent state as a fixed-radix digit vector. Only
/// the current digits are held, so columns can be streamed one at a time.
#[derive(Debug, Clone)]
pub struct ParentCombinations {
    radices: Vec<usize>,
    digits: Vec<usize>,
    started: bool,
    done: bool,
}

impl ParentCombinations {
    pub fn new(radices: Vec<usize>) -> Self {
        let done = radices.contains(&0);
        let digits = vec![0; radices.len()];
        Self {
            radices,
            digits,
            started: false,
            done,
        }
    }

    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Step to the next combination in column order.
    pub fn advance(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.digits);
        }
        let mut pos = self.digits.len();
        loop {
            if pos == 0 {
                self.done = true;
                return None;
            }
            pos -= 1;
            self.digits[pos] += 1;
            if self.digits[pos] < self.radices[pos] {
                return Some(&self.digits);
            }
            self.digits[pos] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(radices: Vec<usize>) -> Vec<Vec<usize>> {
        let mut cursor = ParentCombinations::new(radices);
        let mut out = Vec::new();
        while let Some(digits) = cursor.advance() {
            out.push(digits.to_vec());
        }
        out
    }

    #[test]
    fn enumerates_in_column_order() {
        let combos = collect(vec![2, 3]);
        assert_eq!(
            combos,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
        for (col, digits) in combos.iter().enumerate() {
            assert_eq!(column_index(&[2, 3], digits), Some(col));
        }
    }

    #[test]
    fn no_parents_yields_single_empty_combination() {
        assert_eq!(collect(Vec::new()), vec![Vec::<usize>::new()]);
        assert_eq!(column_count(&[]), Some(1));
    }

    #[test]
    fn zero_radix_yields_nothing() {
        assert!(collect(vec![3, 0]).is_empty());
    }

    #[test]
    fn column_count_detects_overflow() {
        assert_eq!(column_count(&[4, 5, 6]), Some(120));
        assert_eq!(column_count(&[usize::MAX, 2]), None);
    }

    #[test]
    fn column_index_rejects_out_of_range_digits() {
        assert_eq!(column_index(&[2, 2], &[1, 2]), None);
        assert_eq!(column_index(&[2, 2], &[1]), None);
    }
}
