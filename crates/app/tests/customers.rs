mod common;

use anyhow::Result;

use salesdesk_app::AppError;
use salesdesk_core::{DomainError, Entity, EntityId};

use common::{CPF_A, CPF_B, Harness, details, new_customer};

#[test]
fn create_assigns_code_and_id() -> Result<()> {
    let h = Harness::new();

    let first = h.customers.create(new_customer(CPF_A, "Maria@Example.com"))?;
    let second = h.customers.create(new_customer(CPF_B, "joana@example.com"))?;

    assert_eq!(first.code(), "CUST0001");
    assert_eq!(second.code(), "CUST0002");
    assert_eq!(first.id(), Some(EntityId::new(1)));
    assert_eq!(first.email(), "maria@example.com");
    assert_eq!(first.document().cpf(), "12345678909");

    let found = h.customers.find_by_code("CUST0002")?;
    assert!(found.same_code_as(&second));
    Ok(())
}

#[test]
fn duplicate_cpf_or_email_is_a_conflict() -> Result<()> {
    let h = Harness::new();
    h.customers.create(new_customer(CPF_A, "maria@example.com"))?;

    let err = h
        .customers
        .create(new_customer("12345678909", "other@example.com"))
        .unwrap_err();
    match err {
        AppError::Conflict(m) => assert_eq!(m, "cpf already registered"),
        other => panic!("Expected Conflict, got {other:?}"),
    }

    let err = h
        .customers
        .create(new_customer(CPF_B, "MARIA@example.com"))
        .unwrap_err();
    match err {
        AppError::Conflict(m) => assert_eq!(m, "email already registered"),
        other => panic!("Expected Conflict, got {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_document_is_a_validation_error() {
    let h = Harness::new();
    let err = h
        .customers
        .create(new_customer("111.111.111-11", "maria@example.com"))
        .unwrap_err();
    match err {
        AppError::Domain(DomainError::Validation(m)) => assert_eq!(m, "invalid cpf"),
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[test]
fn update_rejects_email_of_another_customer() -> Result<()> {
    let h = Harness::new();
    let maria = h.customers.create(new_customer(CPF_A, "maria@example.com"))?;
    h.customers.create(new_customer(CPF_B, "joana@example.com"))?;
    let id = maria.id().expect("saved customer has an id");

    let mut changed = details("maria@example.com");
    changed.full_name = "Maria Souza Lima".into();
    let updated = h.customers.update(id, changed)?;
    assert_eq!(updated.full_name(), "Maria Souza Lima");

    let err = h.customers.update(id, details("joana@example.com")).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(h.customers.find(id)?.email(), "maria@example.com");
    Ok(())
}

#[test]
fn delete_then_find_is_not_found() -> Result<()> {
    let h = Harness::new();
    let id = h
        .customers
        .create(new_customer(CPF_A, "maria@example.com"))?
        .id()
        .expect("saved customer has an id");

    h.customers.delete(id)?;
    match h.customers.find(id).unwrap_err() {
        AppError::NotFound { entity, .. } => assert_eq!(entity, "customer"),
        other => panic!("Expected NotFound, got {other:?}"),
    }
    assert!(matches!(h.customers.delete(id), Err(AppError::NotFound { .. })));
    Ok(())
}
