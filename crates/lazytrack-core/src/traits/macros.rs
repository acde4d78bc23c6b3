// impl_leaf_node
// Implement `Node` for values the walker never descends into.
macro_rules! impl_leaf_node {
    ($($t:ty),* $(,)?) => {
        $(
            impl crate::traits::Node for $t {
                fn model(&self) -> &'static crate::model::NodeModel {
                    static MODEL: crate::model::NodeModel =
                        crate::model::NodeModel::leaf(stringify!($t));
                    &MODEL
                }

                fn children(&self, _: usize) -> Option<crate::walk::Children<'_>> {
                    None
                }

                fn children_mut(&mut self, _: usize) -> Option<crate::walk::ChildrenMut<'_>> {
                    None
                }
            }
        )*
    };
}
