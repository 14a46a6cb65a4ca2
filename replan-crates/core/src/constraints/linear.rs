use super::Constraint;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;
use crate::engine::variables::TransformableVariable;
use crate::propagators::LinearLessOrEqualConstructor;
use crate::propagators::LinearNotEqualConstructor;
use crate::ConstraintOperationError;
use crate::Solver;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Relation {
    LessOrEqual,
    Equal,
    NotEqual,
}

/// `sum(terms) <relation> rhs`, posted as one or two linear propagators.
#[derive(Clone, Debug)]
struct Linear<Var> {
    terms: Box<[Var]>,
    relation: Relation,
    rhs: i32,
}

impl<Var: IntegerVariable> Linear<Var> {
    fn new(terms: impl Into<Box<[Var]>>, relation: Relation, rhs: i32) -> Self {
        Linear {
            terms: terms.into(),
            relation,
            rhs,
        }
    }

    /// Posts the propagators, each guarded by `guard` when one is given.
    fn add_to(
        self,
        solver: &mut Solver,
        guard: Option<Literal>,
    ) -> Result<(), ConstraintOperationError> {
        match self.relation {
            Relation::LessOrEqual => {
                add(solver, LinearLessOrEqualConstructor::new(self.terms, self.rhs), guard)
            }
            Relation::NotEqual => {
                add(solver, LinearNotEqualConstructor::new(self.terms, self.rhs), guard)
            }
            Relation::Equal => {
                let negated = self.terms.iter().map(|term| term.scaled(-1)).collect();
                add(solver, LinearLessOrEqualConstructor::new(self.terms, self.rhs), guard)?;
                add(solver, LinearLessOrEqualConstructor::new(negated, -self.rhs), guard)
            }
        }
    }
}

fn add(
    solver: &mut Solver,
    constraint: impl Constraint,
    guard: Option<Literal>,
) -> Result<(), ConstraintOperationError> {
    match guard {
        Some(literal) => constraint.implied_by(solver, literal),
        None => constraint.post(solver),
    }
}

impl<Var: IntegerVariable> Constraint for Linear<Var> {
    fn post(self, solver: &mut Solver) -> Result<(), ConstraintOperationError> {
        self.add_to(solver, None)
    }

    fn implied_by(
        self,
        solver: &mut Solver,
        guard: Literal,
    ) -> Result<(), ConstraintOperationError> {
        self.add_to(solver, Some(guard))
    }
}

/// `sum(terms) <= rhs`.
pub fn less_than_or_equals<Var: IntegerVariable>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    Linear::new(terms, Relation::LessOrEqual, rhs)
}

/// `sum(terms) >= rhs`.
pub fn greater_than_or_equals<Var: IntegerVariable>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    let terms: Box<[Var]> = terms.into();
    let negated = terms.iter().map(|term| term.scaled(-1)).collect::<Box<[_]>>();
    Linear::new(negated, Relation::LessOrEqual, -rhs)
}

/// `sum(terms) = rhs`.
pub fn equals<Var: IntegerVariable>(terms: impl Into<Box<[Var]>>, rhs: i32) -> impl Constraint {
    Linear::new(terms, Relation::Equal, rhs)
}

/// `sum(terms) != rhs`.
pub fn not_equals<Var: IntegerVariable>(
    terms: impl Into<Box<[Var]>>,
    rhs: i32,
) -> impl Constraint {
    Linear::new(terms, Relation::NotEqual, rhs)
}

pub fn binary_less_than_or_equals<Var: IntegerVariable>(lhs: Var, rhs: Var) -> impl Constraint {
    less_than_or_equals([lhs.scaled(1), rhs.scaled(-1)], 0)
}

pub fn binary_less_than<Var: IntegerVariable>(lhs: Var, rhs: Var) -> impl Constraint {
    less_than_or_equals([lhs.scaled(1), rhs.scaled(-1)], -1)
}

pub fn binary_equals<Var: IntegerVariable>(lhs: Var, rhs: Var) -> impl Constraint {
    equals([lhs.scaled(1), rhs.scaled(-1)], 0)
}

pub fn binary_not_equals<Var: IntegerVariable>(lhs: Var, rhs: Var) -> impl Constraint {
    not_equals([lhs.scaled(1), rhs.scaled(-1)], 0)
}

/// `a + b = c`; the usual link between the start, duration and end of a task.
pub fn plus<Var: IntegerVariable>(a: Var, b: Var, c: Var) -> impl Constraint {
    equals([a.scaled(1), b.scaled(1), c.scaled(-1)], 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_variables_share_their_bounds() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 6);
        let y = solver.new_bounded_integer(4, 10);

        solver
            .add_constraint(binary_equals(x, y))
            .post()
            .expect("feasible");

        assert_eq!((4, 6), (solver.lower_bound(&x), solver.upper_bound(&x)));
        assert_eq!((4, 6), (solver.lower_bound(&y), solver.upper_bound(&y)));
    }

    #[test]
    fn an_unreachable_sum_is_infeasible_at_the_root() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 2);
        let y = solver.new_bounded_integer(0, 2);

        let result = solver.add_constraint(equals([x, y], 5)).post();

        assert_eq!(Err(ConstraintOperationError::InfeasiblePropagator), result);
        assert!(solver.is_infeasible());
    }

    #[test]
    fn a_task_end_follows_its_start_and_duration() {
        let mut solver = Solver::default();
        let start = solver.new_bounded_integer(2, 4);
        let duration = solver.new_bounded_integer(3, 3);
        let end = solver.new_bounded_integer(0, 100);

        solver
            .add_constraint(plus(start, duration, end))
            .post()
            .expect("feasible");

        assert_eq!((5, 7), (solver.lower_bound(&end), solver.upper_bound(&end)));
    }

    #[test]
    fn a_false_guard_leaves_the_bounds_alone() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(0, 10);
        let guard = solver.new_literal();

        solver
            .add_constraint(less_than_or_equals([x], 4))
            .implied_by(guard)
            .expect("feasible");
        assert_eq!(10, solver.upper_bound(&x));

        solver
            .add_constraint(less_than_or_equals([guard], 0))
            .post()
            .expect("feasible");
        assert_eq!(10, solver.upper_bound(&x));
    }
}
