//! # 常用接口模块
//!
//! 本模块提供单元测试用的断言宏与测试替身


#[cfg(test)]
pub(crate) mod test_fixtures;
