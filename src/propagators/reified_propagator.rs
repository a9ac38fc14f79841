use crate::basic_types::PropagationStatusCP;
use crate::engine::notifications::DomainEvents;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::Domains;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Priority;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::Literal;

/// The [`PropagatorConstructor`] for the [`ReifiedPropagator`]: posts `r -> C` for the wrapped
/// constraint `C` and reification literal `r`.
#[derive(Clone, Debug)]
pub struct ReifiedPropagatorArgs<C> {
    pub propagator: C,
    pub reification_literal: Literal,
}

impl<C: PropagatorConstructor> PropagatorConstructor for ReifiedPropagatorArgs<C>
where
    C::PropagatorImpl: 'static,
{
    type PropagatorImpl = ReifiedPropagator<C::PropagatorImpl>;

    fn create(self, mut context: PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        let propagator = self.propagator.create(context.reborrow());
        context.register(
            self.reification_literal.domain_id(),
            DomainEvents::ASSIGN,
            // A position that does not clash with the positions of the wrapped propagator.
            LocalId::from(u32::MAX),
        );

        let name = format!("Reified({})", propagator.name());
        ReifiedPropagator {
            propagator,
            reification_literal: self.reification_literal,
            name,
            reason_buffer: Vec::default(),
        }
    }
}

/// A propagator which enforces the wrapped propagator only when its reification literal is true,
/// and propagates the literal to false when the wrapped relation is inconsistent (half
/// reification).
///
/// While the literal is false the constraint is vacuous and the propagator declares itself
/// passive.
#[derive(Debug)]
pub struct ReifiedPropagator<WrappedPropagator> {
    propagator: WrappedPropagator,
    reification_literal: Literal,
    name: String,
    /// Scratch space for extending the wrapped propagator's lazy explanations with the literal.
    reason_buffer: Vec<Predicate>,
}

impl<WrappedPropagator: Propagator> Propagator for ReifiedPropagator<WrappedPropagator> {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.propagator.priority()
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatusCP {
        if context.is_literal_true(&self.reification_literal) {
            context.with_reification(self.reification_literal);
            self.propagator.propagate(context)
        } else if context.is_literal_false(&self.reification_literal) {
            context.set_passive();
            Ok(())
        } else if let Some(conjunction) =
            self.propagator.detect_inconsistency(context.as_readonly())
        {
            context.post(self.reification_literal.get_false_predicate(), conjunction)
        } else {
            Ok(())
        }
    }

    fn synchronise(&mut self, context: Domains) {
        self.propagator.synchronise(context);
    }

    fn is_entailed(&self, context: Domains) -> Entailment {
        if context.is_literal_false(&self.reification_literal) {
            // The implication is vacuously true.
            return Entailment::True;
        }
        let literal_true = context.is_literal_true(&self.reification_literal);
        match self.propagator.is_entailed(context) {
            Entailment::True => Entailment::True,
            Entailment::False if literal_true => Entailment::False,
            _ => Entailment::Undefined,
        }
    }

    fn lazy_explanation(&mut self, code: u64, context: ExplanationContext) -> &[Predicate] {
        let inner = self.propagator.lazy_explanation(code, context).to_vec();
        self.reason_buffer = inner;
        self.reason_buffer
            .push(self.reification_literal.get_true_predicate());
        &self.reason_buffer
    }
}
