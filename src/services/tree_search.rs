//! 文档树搜索
//!
//! 在任意文档树中，找出某个标签下文本包含指定内容、且嵌套最深的元素。
//! 同样的文字往往同时出现在祖先和后代节点里，最深的那个最贴近真正的值。

use scraper::ElementRef;

/// 抽象的文档树节点
pub trait TreeNode: Clone {
    /// 标签名（小写）
    fn tag(&self) -> &str;

    fn parent_node(&self) -> Option<Self>;

    /// 元素子节点，按文档顺序
    fn child_nodes(&self) -> Vec<Self>;

    /// 全部后代文本拼接
    fn text_content(&self) -> String;
}

impl<'a> TreeNode for ElementRef<'a> {
    fn tag(&self) -> &str {
        self.value().name()
    }

    fn parent_node(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

/// 祖先链长度（节点自身计 1）
pub fn depth<N: TreeNode>(node: &N) -> usize {
    std::iter::successors(Some(node.clone()), |n| n.parent_node()).count()
}

/// 在 `root` 及其后代中查找标签为 `tag`、文本包含 `needle` 的最深元素
///
/// 深度相同时取文档顺序中第一个。
pub fn deepest_match<N: TreeNode>(root: &N, tag: &str, needle: &str) -> Option<N> {
    let mut best: Option<(usize, N)> = None;
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if node.tag().eq_ignore_ascii_case(tag) && node.text_content().contains(needle) {
            let node_depth = depth(&node);
            if best.as_ref().map_or(true, |(d, _)| node_depth > *d) {
                best = Some((node_depth, node.clone()));
            }
        }
        // 逆序压栈，保证按文档顺序出栈
        stack.extend(node.child_nodes().into_iter().rev());
    }

    best.map(|(_, node)| node)
}
