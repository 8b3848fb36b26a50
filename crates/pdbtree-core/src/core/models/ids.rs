use slotmap::new_key_type;

new_key_type! {
    pub struct ModelId;
    pub struct ChainId;
    pub struct ResidueGroupId;
    pub struct ConformerId;
    pub struct AtomId;
}
