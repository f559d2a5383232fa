use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::cart::{validate_quantity, Cart, CartItem};
use models::record::{find_by_id, find_by_id_mut, remove_by_id, RecordId};

use crate::cart::CartView;
use crate::errors::ServiceError;
use crate::ids::IdPolicy;
use crate::product::ProductCatalog;
use crate::storage::{modify, RecordStore};

/// Cart operations over a cart collection.
///
/// Product ids are checked against the catalog before the cart location is
/// locked, so a product deleted in between can leave a dangling item;
/// [`CartRepository::get_populated`] reports those as missing.
pub struct CartRepository {
    store: Arc<dyn RecordStore<Cart>>,
    products: Arc<dyn ProductCatalog>,
    ids: IdPolicy,
}

impl CartRepository {
    pub fn new(store: Arc<dyn RecordStore<Cart>>, products: Arc<dyn ProductCatalog>, ids: IdPolicy) -> Self {
        Self { store, products, ids }
    }

    pub fn location(&self) -> &str { self.store.location() }

    async fn ensure_product(&self, product_id: RecordId) -> Result<(), ServiceError> {
        if self.products.get_by_id(product_id).await?.is_none() {
            warn!(product_id, "unknown product referenced by cart operation");
            return Err(ServiceError::not_found("product"));
        }
        Ok(())
    }

    /// Apply `f` to one cart and persist. `None` when the cart does not exist.
    async fn with_cart<F>(&self, cart_id: RecordId, f: F) -> Result<Option<Cart>, ServiceError>
    where
        F: FnOnce(&mut Cart) -> Result<(), ServiceError> + Send,
    {
        modify(self.store.as_ref(), move |carts| match find_by_id_mut(carts, cart_id) {
            Some(cart) => {
                f(cart)?;
                Ok(Some(cart.clone()))
            }
            None => Ok(None),
        })
        .await
    }

    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn create(&self) -> Result<Cart, ServiceError> {
        let ids = self.ids;
        let cart = modify(self.store.as_ref(), move |carts| {
            let cart = Cart::new(ids.next_id(carts));
            carts.push(cart.clone());
            Ok(cart)
        })
        .await?;
        info!(id = cart.id, "cart created");
        Ok(cart)
    }

    pub async fn get_all(&self) -> Result<Vec<Cart>, ServiceError> {
        self.store.load().await
    }

    pub async fn get_by_id(&self, cart_id: RecordId) -> Result<Option<Cart>, ServiceError> {
        let carts = self.store.load().await?;
        Ok(find_by_id(&carts, cart_id).cloned())
    }

    /// Add one unit of a product: bump the existing item or append a new one.
    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn add_product(&self, cart_id: RecordId, product_id: RecordId) -> Result<Option<Cart>, ServiceError> {
        self.ensure_product(product_id).await?;
        let cart = self
            .with_cart(cart_id, move |cart| {
                cart.add_one(product_id);
                Ok(())
            })
            .await?;
        if cart.is_some() {
            info!(cart_id, product_id, "product added to cart");
        }
        Ok(cart)
    }

    /// Replace every item. All products must exist; duplicates are merged.
    #[instrument(skip(self, items), fields(location = %self.store.location(), items = items.len()))]
    pub async fn replace_products(&self, cart_id: RecordId, items: Vec<CartItem>) -> Result<Option<Cart>, ServiceError> {
        for item in &items {
            validate_quantity(item.quantity)?;
        }
        let mut product_ids: Vec<RecordId> = items.iter().map(|i| i.product).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        for product_id in product_ids {
            self.ensure_product(product_id).await?;
        }
        self.with_cart(cart_id, move |cart| Ok(cart.replace(items)?)).await
    }

    /// Drop one product from the cart. Absent items are ignored.
    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn remove_product(&self, cart_id: RecordId, product_id: RecordId) -> Result<Option<Cart>, ServiceError> {
        self.with_cart(cart_id, move |cart| {
            if !cart.remove(product_id) {
                info!(cart_id, product_id, "product not in cart");
            }
            Ok(())
        })
        .await
    }

    /// Set an explicit quantity for a product already in the cart.
    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn set_quantity(
        &self,
        cart_id: RecordId,
        product_id: RecordId,
        quantity: u32,
    ) -> Result<Option<Cart>, ServiceError> {
        validate_quantity(quantity)?;
        self.with_cart(cart_id, move |cart| {
            if cart.set_quantity(product_id, quantity)? {
                Ok(())
            } else {
                Err(ServiceError::not_found("cart item"))
            }
        })
        .await
    }

    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn clear(&self, cart_id: RecordId) -> Result<Option<Cart>, ServiceError> {
        self.with_cart(cart_id, |cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn delete(&self, cart_id: RecordId) -> Result<bool, ServiceError> {
        let existed = modify(self.store.as_ref(), move |carts| Ok(remove_by_id(carts, cart_id))).await?;
        info!(cart_id, existed, "cart delete");
        Ok(existed)
    }

    /// Cart joined with current product records.
    pub async fn get_populated(&self, cart_id: RecordId) -> Result<Option<CartView>, ServiceError> {
        let Some(cart) = self.get_by_id(cart_id).await? else {
            return Ok(None);
        };
        let products = self.products.get_all().await?;
        Ok(Some(CartView::build(&cart, &products)))
    }
}
