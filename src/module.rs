/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : Module trait 定义
 */

/// 模块 trait（待优化的模型）
///
/// 模型本身不在本 crate 内实现：调用方只需按名称列出可训练参数。
/// `P` 是调用方自己的参数句柄类型（如 ID 或 `Rc<RefCell<..>>`），要求可廉价克隆。
///
/// # 使用示例
///
/// ```ignore
/// struct Tracker {
///     backbone: Vec<ParamId>,
///     head: Vec<ParamId>,
/// }
///
/// impl Module<ParamId> for Tracker {
///     fn named_parameters(&self) -> Vec<(String, ParamId)> {
///         let backbone = self.backbone.iter().enumerate()
///             .map(|(i, p)| (format!("basemodel.conv{i}.weight"), *p));
///         let head = self.head.iter().enumerate()
///             .map(|(i, p)| (format!("head.cls{i}.weight"), *p));
///         backbone.chain(head).collect()
///     }
/// }
/// ```
pub trait Module<P: Clone> {
    /// 获取所有可训练参数（带层级名称，如`basemodel.conv1.weight`）
    ///
    /// 这是 Module trait 的唯一必须实现的方法。
    fn named_parameters(&self) -> Vec<(String, P)>;

    /// 获取所有可训练参数（不带名称）
    fn parameters(&self) -> Vec<P> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }
}
