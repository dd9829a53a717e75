use slotmap::new_key_type;

new_key_type! {
    /// Identifies a resource pool in the plant.
    pub struct ResourceId;

    /// Identifies a production system in the plant.
    pub struct SystemId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn ids_are_distinct_per_insertion() {
        let mut sm = SlotMap::<ResourceId, ()>::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut sm = SlotMap::<SystemId, ()>::with_key();
        let id = sm.insert(());
        let mut map = HashMap::new();
        map.insert(id, "smelter");
        assert_eq!(map[&id], "smelter");
    }
}
