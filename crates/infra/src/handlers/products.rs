use catalog_core::{DomainError, DomainResult};
use catalog_events::{CreateProduct, DeleteProduct, UpdateProduct};
use catalog_products::Product;

use super::on_duplicate;
use crate::db::Filter;
use crate::unit_of_work::UnitOfWork;

pub fn create_product(cmd: &CreateProduct, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!(sku = %cmd.sku, "creating product");
    uow.repository()
        .add(Product::create(cmd))
        .map_err(on_duplicate("Product already exists"))
}

/// Overwrite every field of the product found by `cmd.sku`.
///
/// The new sku may clash with another product; that surfaces here as a
/// `DuplicateKey` rather than at commit.
pub fn update_product(cmd: &UpdateProduct, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!(sku = %cmd.sku, "updating product");
    let product = uow
        .repository()
        .get_mut::<Product>(&Filter::by("sku", cmd.sku.as_str()))?;
    product.apply_update(cmd.product.clone());

    uow.flush()
        .map_err(on_duplicate("The parameters are not valid, remember sku is unique"))
}

pub fn delete_product(cmd: &DeleteProduct, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!(sku = %cmd.sku, "deleting product");
    uow.repository()
        .get_mut::<Product>(&Filter::by("sku", cmd.sku.as_str()))?
        .mark_deleted();

    if uow.repository().delete::<Product>("sku", &cmd.sku) == 0 {
        return Err(DomainError::not_found("Product not found"));
    }
    Ok(())
}
