use crate::calabash_assert_moderate;
use crate::engine::trailed::Environment;
use crate::engine::trailed::RevBitSet;
use crate::engine::trailed::RevInt;

/// The representation of one integer domain.
///
/// Bounds are reversible cells; the enumerated representation additionally keeps a reversible bit
/// set of members and a reversible size. Constants have no reversible state at all.
#[derive(Clone, Copy, Debug)]
pub(crate) enum IntegerDomain {
    Interval(IntervalDomain),
    Sparse(SparseDomain),
    Constant(i32),
}

/// A bounded interval `[lb, ub]`. Interior values cannot be removed; only the bounds move.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntervalDomain {
    pub(crate) lower_bound: RevInt,
    pub(crate) upper_bound: RevInt,
}

/// An enumerated domain over `[offset, offset + bits.capacity())`.
///
/// The bit set records explicit removals; bound updates move the bound cells without clearing
/// bits, so membership is the conjunction of the bit and the bound check. The invariant is that
/// `lb` and `ub` are always members and `size >= 1`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SparseDomain {
    pub(crate) bits: RevBitSet,
    pub(crate) offset: i32,
    pub(crate) lower_bound: RevInt,
    pub(crate) upper_bound: RevInt,
    pub(crate) size: RevInt,
}

impl SparseDomain {
    fn bit_index(&self, value: i32) -> u32 {
        (value - self.offset) as u32
    }

    fn value_at(&self, bit: u32) -> i32 {
        self.offset + bit as i32
    }

    pub(crate) fn bit_is_set(&self, env: &Environment, value: i32) -> bool {
        value >= self.offset
            && self.bit_index(value) < self.bits.capacity()
            && self.bits.contains(env, self.bit_index(value))
    }

    /// The least member that is at least `value`; `None` when `value` exceeds every set bit.
    pub(crate) fn next_member_from(&self, env: &Environment, value: i32) -> Option<i32> {
        if value < self.offset {
            return self.bits.next_set(env, 0).map(|bit| self.value_at(bit));
        }
        let from = value - self.offset;
        if from as u32 >= self.bits.capacity() {
            return None;
        }
        self.bits
            .next_set(env, from as u32)
            .map(|bit| self.value_at(bit))
    }

    /// The greatest member that is at most `value`.
    pub(crate) fn previous_member_from(&self, env: &Environment, value: i32) -> Option<i32> {
        if value < self.offset {
            return None;
        }
        let from = (value - self.offset).min(self.bits.capacity() as i32 - 1);
        self.bits
            .prev_set(env, from as u32)
            .map(|bit| self.value_at(bit))
    }

    /// The number of members in `[from, to]`.
    pub(crate) fn count_members_in(&self, env: &Environment, from: i32, to: i32) -> u32 {
        if to < from {
            return 0;
        }
        let from = from.max(self.offset);
        let to = to.min(self.offset + self.bits.capacity() as i32 - 1);
        if to < from {
            return 0;
        }
        self.bits
            .count_in(env, self.bit_index(from), self.bit_index(to))
    }
}

impl IntegerDomain {
    pub(crate) fn lower_bound(&self, env: &Environment) -> i32 {
        match self {
            IntegerDomain::Interval(interval) => env.int_value(interval.lower_bound) as i32,
            IntegerDomain::Sparse(sparse) => env.int_value(sparse.lower_bound) as i32,
            IntegerDomain::Constant(value) => *value,
        }
    }

    pub(crate) fn upper_bound(&self, env: &Environment) -> i32 {
        match self {
            IntegerDomain::Interval(interval) => env.int_value(interval.upper_bound) as i32,
            IntegerDomain::Sparse(sparse) => env.int_value(sparse.upper_bound) as i32,
            IntegerDomain::Constant(value) => *value,
        }
    }

    pub(crate) fn size(&self, env: &Environment) -> i64 {
        match self {
            IntegerDomain::Interval(_) => {
                (self.upper_bound(env) - self.lower_bound(env)) as i64 + 1
            }
            IntegerDomain::Sparse(sparse) => env.int_value(sparse.size),
            IntegerDomain::Constant(_) => 1,
        }
    }

    pub(crate) fn contains(&self, env: &Environment, value: i32) -> bool {
        if value < self.lower_bound(env) || value > self.upper_bound(env) {
            return false;
        }
        match self {
            IntegerDomain::Interval(_) | IntegerDomain::Constant(_) => true,
            IntegerDomain::Sparse(sparse) => sparse.bit_is_set(env, value),
        }
    }

    pub(crate) fn next_value(&self, env: &Environment, value: i32) -> Option<i32> {
        let lower_bound = self.lower_bound(env);
        let upper_bound = self.upper_bound(env);
        if value >= upper_bound {
            return None;
        }
        let from = (value + 1).max(lower_bound);
        match self {
            IntegerDomain::Interval(_) => Some(from),
            IntegerDomain::Constant(constant) => Some(*constant),
            IntegerDomain::Sparse(sparse) => {
                let found = sparse.next_member_from(env, from);
                calabash_assert_moderate!(
                    found.is_some_and(|member| member <= upper_bound),
                    "the upper bound is a member, so a successor below it must exist"
                );
                found
            }
        }
    }

    pub(crate) fn previous_value(&self, env: &Environment, value: i32) -> Option<i32> {
        let lower_bound = self.lower_bound(env);
        let upper_bound = self.upper_bound(env);
        if value <= lower_bound {
            return None;
        }
        let from = (value - 1).min(upper_bound);
        match self {
            IntegerDomain::Interval(_) => Some(from),
            IntegerDomain::Constant(constant) => Some(*constant),
            IntegerDomain::Sparse(sparse) => {
                let found = sparse.previous_member_from(env, from);
                calabash_assert_moderate!(
                    found.is_some_and(|member| member >= lower_bound),
                    "the lower bound is a member, so a predecessor above it must exist"
                );
                found
            }
        }
    }

    pub(crate) fn is_fixed(&self, env: &Environment) -> bool {
        self.lower_bound(env) == self.upper_bound(env)
    }

    pub(crate) fn has_enumerated_representation(&self) -> bool {
        matches!(self, IntegerDomain::Sparse(_))
    }
}
