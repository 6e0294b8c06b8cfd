use super::backend::WgpuProgram;
use super::context::GpuContext;

/// Draws the full-screen triangle with `program` and presents the frame.
pub(crate) fn render(context: &GpuContext, program: &WgpuProgram) -> Result<(), wgpu::SurfaceError> {
    let frame = context.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("art encoder"),
        });

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("art pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&program.pipeline);
        render_pass.set_bind_group(artgen::assemble::block::SET, &program.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    context.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}
