/*
 * @Author       : 老董
 * @Date         : 2026-10-18
 * @Description  : 优化器模块单元测试
 *
 * 测试按功能分组：
 * - base: 底层优化器 trait 默认行为与状态字典
 * - wrapper: 优化器封装（超参、懒构建、分组、转发、调度）
 */
