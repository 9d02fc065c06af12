use kernel::id::Id;

#[derive(Clone, Copy)]
pub struct AccountMarker;
pub type AccountId = Id<AccountMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_new() {
        let account_id = AccountId::new();
        let uuid = account_id.as_uuid();
        assert_eq!(uuid.get_version_num(), 4); // UUIDv4
    }

    #[test]
    fn test_from_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let account_id = AccountId::from_uuid(uuid);
        assert_eq!(account_id.as_uuid(), &uuid);
    }
}
