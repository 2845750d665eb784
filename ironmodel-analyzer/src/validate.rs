//! Structural validation of the resolved model.

use crate::error::{AnalyzerError, Result};
use ironmodel_core::{Model, Name, ServiceId, TypeId};

/// Checks that struct and service inheritance chains are acyclic.
///
/// # Errors
/// Returns `AnalyzerError::CircularInheritance` naming the first cycle found,
/// in name order.
pub fn check_inheritance(model: &Model) -> Result<()> {
    for (id, _) in model.structs() {
        let base = |t: TypeId| model.ty(t).as_struct().and_then(|s| s.base);
        let name = |t: TypeId| model.ty(t).name().clone();
        if let Some(cycle) = find_cycle(id, base, name) {
            return Err(AnalyzerError::circular("type", cycle));
        }
    }

    for (id, _) in model.services() {
        let base = |s: ServiceId| model.service(s).as_defined().and_then(|d| d.base);
        let name = |s: ServiceId| model.service(s).name().clone();
        if let Some(cycle) = find_cycle(id, base, name) {
            return Err(AnalyzerError::circular("service", cycle));
        }
    }

    Ok(())
}

fn find_cycle<I, B, N>(start: I, base: B, name: N) -> Option<Vec<Name>>
where
    I: Copy + PartialEq,
    B: Fn(I) -> Option<I>,
    N: Fn(I) -> Name,
{
    let mut chain = vec![start];
    let mut current = base(start);
    while let Some(next) = current {
        if let Some(position) = chain.iter().position(|&seen| seen == next) {
            let mut cycle: Vec<Name> = chain[position..].iter().map(|&i| name(i)).collect();
            cycle.push(name(next));
            return Some(cycle);
        }
        chain.push(next);
        current = base(next);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironmodel_core::{Concept, StructType, Type};

    fn declare(model: &mut Model, name: &str) -> TypeId {
        let id = model.alloc_type(Type::Struct(StructType::new(Concept::new(Name::from_case(name)))));
        model.add_type(id).expect("Failed to add type");
        id
    }

    fn set_base(model: &mut Model, ty: TypeId, base: TypeId) {
        if let Some(s) = model.ty_mut(ty).as_struct_mut() {
            s.base = Some(base);
        }
    }

    #[test]
    fn test_acyclic_chain_is_valid() {
        let mut model = Model::new();
        let identified = declare(&mut model, "Identified");
        let vm = declare(&mut model, "Vm");
        set_base(&mut model, vm, identified);
        assert!(check_inheritance(&model).is_ok());
    }

    #[test]
    fn test_cycle_is_reported() {
        let mut model = Model::new();
        let a = declare(&mut model, "A");
        let b = declare(&mut model, "B");
        set_base(&mut model, a, b);
        set_base(&mut model, b, a);

        let err = check_inheritance(&model).expect_err("cycle accepted");
        assert_eq!(
            err.to_string(),
            "circular type inheritance detected: a -> b -> a"
        );
    }

    #[test]
    fn test_self_inheritance_is_a_cycle() {
        let mut model = Model::new();
        let a = declare(&mut model, "A");
        set_base(&mut model, a, a);
        assert!(matches!(
            check_inheritance(&model),
            Err(AnalyzerError::CircularInheritance { kind: "type", .. })
        ));
    }
}
