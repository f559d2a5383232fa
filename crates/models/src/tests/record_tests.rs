use crate::cart::Cart;
use crate::record::{find_by_id, find_by_id_mut, max_id, remove_by_id};

#[test]
fn lookup_and_remove_by_id() {
    let mut carts = vec![Cart::new(1), Cart::new(4), Cart::new(2)];
    assert_eq!(find_by_id(&carts, 4).map(|c| c.id), Some(4));
    assert!(find_by_id(&carts, 9).is_none());
    assert_eq!(max_id(&carts), Some(4));

    find_by_id_mut(&mut carts, 2).unwrap().add_one(7);
    assert_eq!(carts[2].products.len(), 1);

    assert!(remove_by_id(&mut carts, 4));
    assert!(!remove_by_id(&mut carts, 4));
    assert_eq!(carts.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn max_id_of_empty_collection() {
    let empty: Vec<Cart> = Vec::new();
    assert_eq!(max_id(&empty), None);
}
