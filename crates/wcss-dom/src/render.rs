//! The renderable model.
//!
//! Renderables are the presentation objects a host toolkit would draw. The
//! cascade never sees widgets, only this closed set of node kinds and the
//! per-state [`Style`] objects it mutates. Layout consumes the finished tree.

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use serde::Serialize;

/// A type-safe index into the render tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RenderId(pub usize);

/// The capability variant of a renderable.
///
/// Recursive propagation (color, font, alignment...) switches on this
/// instead of inspecting concrete widget types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderKind {
    /// A box holding other renderables.
    Container,
    /// A run of text, usually one word.
    TextRun,
    /// A run of text inside an anchor.
    Link,
    /// A table body.
    Table,
    /// Anything else: images, form controls, rules, list bullets.
    Generic,
}

impl RenderKind {
    /// Text runs and link runs.
    #[must_use]
    pub const fn is_label(self) -> bool {
        matches!(self, Self::TextRun | Self::Link)
    }

    /// Containers and tables both hold children.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Container | Self::Table)
    }
}

/// One of the three logical style states of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StyleState {
    /// The resting state.
    Unselected,
    /// Focused (also used for hover).
    Selected,
    /// Active / pressed.
    Pressed,
}

impl StyleState {
    /// All states in storage order.
    pub const ALL: [Self; 3] = [Self::Unselected, Self::Selected, Self::Pressed];

    const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// A set of style states a declaration applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct StateMask: u8 {
        /// The resting state.
        const UNSELECTED = 1;
        /// The focused state.
        const SELECTED = 1 << 1;
        /// The pressed state.
        const PRESSED = 1 << 2;
    }
}

impl StateMask {
    /// The states in this mask, in storage order.
    pub fn states(self) -> impl Iterator<Item = StyleState> {
        StyleState::ALL
            .into_iter()
            .filter(move |state| self.contains(Self::from(*state)))
    }
}

impl From<StyleState> for StateMask {
    fn from(state: StyleState) -> Self {
        match state {
            StyleState::Unselected => Self::UNSELECTED,
            StyleState::Selected => Self::SELECTED,
            StyleState::Pressed => Self::PRESSED,
        }
    }
}

/// A box side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    #[allow(missing_docs)]
    Top,
    #[allow(missing_docs)]
    Right,
    #[allow(missing_docs)]
    Bottom,
    #[allow(missing_docs)]
    Left,
}

impl Side {
    /// All sides in CSS order (top, right, bottom, left).
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Top and bottom are vertical.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Per-side integer values (margins, padding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Insets {
    #[allow(missing_docs)]
    pub top: i32,
    #[allow(missing_docs)]
    pub right: i32,
    #[allow(missing_docs)]
    pub bottom: i32,
    #[allow(missing_docs)]
    pub left: i32,
}

impl Insets {
    /// The value of one side.
    #[must_use]
    pub const fn get(&self, side: Side) -> i32 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// Set one side.
    pub const fn set(&mut self, side: Side, value: i32) {
        match side {
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
    }

    /// Add to one side.
    pub const fn add(&mut self, side: Side, delta: i32) {
        self.set(side, self.get(side) + delta);
    }
}

/// Border line styles. `none` is represented by the absence of a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum BorderLine {
    Solid,
    Dotted,
    Dashed,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderLine {
    /// Groove, ridge, inset and outset are drawn with light/dark shading.
    #[must_use]
    pub const fn is_3d(self) -> bool {
        matches!(self, Self::Groove | Self::Ridge | Self::Inset | Self::Outset)
    }
}

/// One side of a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BorderSide {
    /// Line style.
    pub line: BorderLine,
    /// Width in pixels.
    pub width: i32,
    /// RGB color, `None` for the foreground color.
    pub color: Option<u32>,
}

/// A compound border: up to four sides plus an optional border drawn
/// outside it (outlines).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Border {
    #[allow(missing_docs)]
    pub top: Option<BorderSide>,
    #[allow(missing_docs)]
    pub right: Option<BorderSide>,
    #[allow(missing_docs)]
    pub bottom: Option<BorderSide>,
    #[allow(missing_docs)]
    pub left: Option<BorderSide>,
    /// A border layered outside this one.
    pub outer: Option<Box<Border>>,
}

impl Border {
    /// The same side on all four edges.
    #[must_use]
    pub const fn uniform(side: BorderSide) -> Self {
        Self {
            top: Some(side),
            right: Some(side),
            bottom: Some(side),
            left: Some(side),
            outer: None,
        }
    }

    /// One side.
    #[must_use]
    pub const fn side(&self, side: Side) -> Option<BorderSide> {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// Replace one side.
    pub const fn set_side(&mut self, side: Side, value: Option<BorderSide>) {
        match side {
            Side::Top => self.top = value,
            Side::Right => self.right = value,
            Side::Bottom => self.bottom = value,
            Side::Left => self.left = value,
        }
    }

    /// True if no side is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Side::ALL.iter().all(|&s| self.side(s).is_none())
    }
}

/// A font request or resolved font.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Font {
    /// Family name.
    pub family: String,
    /// Pixel size; also the line height.
    pub size: i32,
    #[allow(missing_docs)]
    pub bold: bool,
    #[allow(missing_docs)]
    pub italic: bool,
}

impl Font {
    /// The family used when nothing else is known.
    pub const DEFAULT_FAMILY: &'static str = "system";
    /// The medium font size.
    pub const MEDIUM_SIZE: i32 = 15;

    /// The font's height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.size
    }
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: Self::DEFAULT_FAMILY.to_string(),
            size: Self::MEDIUM_SIZE,
            bold: false,
            italic: false,
        }
    }
}

/// Background image tiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BackgroundRepeat {
    /// Draw once.
    NoRepeat,
    /// Tile in both directions.
    #[default]
    TileBoth,
    /// Tile horizontally.
    TileHorizontal,
    /// Tile vertically.
    TileVertical,
}

/// Recognised image containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum ImageFormat {
    Png,
    Gif,
    Jpeg,
    Bmp,
    Wbmp,
}

impl ImageFormat {
    /// Identify an image from its leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'B', b'M', ..] => Some(Self::Bmp),
            [0x00, 0x00, ..] if bytes.len() > 4 => Some(Self::Wbmp),
            _ => None,
        }
    }
}

/// A fetched image attached to a renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
    /// The absolute URL it was fetched from.
    pub url: String,
    /// Detected container format.
    pub format: ImageFormat,
    /// Payload size.
    pub byte_len: usize,
}

/// Background settings of one style state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Background {
    /// Absolute URL of the requested image.
    pub url: Option<String>,
    /// Tiling mode.
    pub repeat: BackgroundRepeat,
    /// Horizontal position; percentage-tagged values are kept as-is for layout.
    pub position_x: Option<i32>,
    /// Vertical position.
    pub position_y: Option<i32>,
    /// `background-attachment: fixed`.
    pub fixed: bool,
    /// The image once fetched.
    pub image: Option<ImageData>,
}

bitflags! {
    /// Text decoration lines.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct TextDecoration: u8 {
        #[allow(missing_docs)]
        const UNDERLINE = 1;
        #[allow(missing_docs)]
        const LINE_THROUGH = 1 << 1;
        #[allow(missing_docs)]
        const OVERLINE = 1 << 2;
    }
}

/// The presentation state of one style state of a renderable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    /// Foreground color, `None` for the theme default.
    pub fg_color: Option<u32>,
    /// Background color, `None` for transparent.
    pub bg_color: Option<u32>,
    /// Background opacity (0 transparent, 255 opaque).
    pub bg_transparency: u8,
    /// Background image settings.
    pub background: Background,
    /// Border, if any side is drawn.
    pub border: Option<Border>,
    #[allow(missing_docs)]
    pub margin: Insets,
    #[allow(missing_docs)]
    pub padding: Insets,
    #[allow(missing_docs)]
    pub font: Font,
    #[allow(missing_docs)]
    pub decoration: TextDecoration,
}

bitflags! {
    /// Node-level state that is not per style state.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct NodeFlags: u8 {
        /// `visibility: hidden`.
        const HIDDEN = 1;
        /// Disabled along with hiding.
        const DISABLED = 1 << 1;
        /// Right-to-left text direction.
        const RTL = 1 << 2;
        /// `display: -wap-marquee`.
        const MARQUEE = 1 << 3;
        /// Focus re-styling is delegated to this container by a link inside it.
        const FOCUS_DELEGATE = 1 << 4;
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// `float` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum Float {
    Left,
    Right,
    None,
}

/// `clear` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum Clear {
    Left,
    Right,
    None,
    Both,
}

/// Preferred size hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeHint {
    #[allow(missing_docs)]
    pub width: Option<i32>,
    #[allow(missing_docs)]
    pub height: Option<i32>,
}

/// The link a run belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkState {
    /// Target as authored.
    pub href: String,
    /// True if the target is in the visited set.
    pub visited: bool,
}

/// Table presentation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableSettings {
    /// `border-collapse: collapse`.
    pub collapse: Option<bool>,
    /// `empty-cells: show`.
    pub show_empty_cells: Option<bool>,
    /// `caption-side: bottom`.
    pub caption_bottom: Option<bool>,
    /// Horizontal and vertical `border-spacing`.
    pub spacing: Option<(i32, i32)>,
}

/// List bullet/number styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub enum ListStyleType {
    None,
    Disc,
    Circle,
    Square,
    Decimal,
    UpperAlpha,
    LowerAlpha,
    UpperRoman,
    LowerRoman,
}

/// The bullet of a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMarker {
    /// Bullet or numbering style.
    pub style: ListStyleType,
    /// 1-based position within the list.
    pub ordinal: usize,
    /// Absolute URL of a bullet image.
    pub image_url: Option<String>,
}

/// Form control state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    /// `-wap-input-format` mask.
    pub format: Option<String>,
    /// `-wap-input-required`.
    pub required: bool,
}

/// An image placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageSlot {
    /// Absolute URL.
    pub src: String,
    /// Alternative text shown until (or instead of) the image.
    pub alt: Option<String>,
    /// The image once fetched.
    pub data: Option<ImageData>,
}

/// Which side of an element generated content was placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneratedPosition {
    /// `:before` content.
    Before,
    /// `:after` content.
    After,
}

impl GeneratedPosition {
    /// The single-letter client marker (`b` before, `a` after).
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Before => 'b',
            Self::After => 'a',
        }
    }
}

/// Marks a renderable as generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Generated {
    /// Where it was generated.
    pub position: GeneratedPosition,
    /// Quote index for generated quotes (0/1 primary open/close, 2/3 nested).
    pub quote: Option<u8>,
}

/// A node of the render tree.
#[derive(Debug, Clone, Serialize)]
pub struct RenderNode {
    /// Capability variant.
    pub kind: RenderKind,
    /// Parent renderable.
    pub parent: Option<RenderId>,
    /// Ordered children.
    pub children: Vec<RenderId>,
    /// Text of runs and generated labels.
    pub text: Option<String>,
    /// Unselected, selected, pressed.
    pub styles: [Style; 3],
    /// Node-level flags.
    pub flags: NodeFlags,
    /// Horizontal alignment of contents.
    pub align: Option<HAlign>,
    /// Vertical alignment of contents.
    pub valign: Option<VAlign>,
    /// Float hint.
    pub float: Option<Float>,
    /// Clear hint.
    pub clear: Option<Clear>,
    /// Preferred size.
    pub size: SizeHint,
    /// Set on link runs.
    pub link: Option<LinkState>,
    /// Set on tables.
    pub table: Option<TableSettings>,
    /// Set on list bullets.
    pub list_marker: Option<ListMarker>,
    /// Set on form controls.
    pub input: Option<InputState>,
    /// Set on images.
    pub image: Option<ImageSlot>,
    /// Access key code points.
    pub access_keys: Vec<u32>,
    /// Set on generated content.
    pub generated: Option<Generated>,
    /// Quote index of an authored `q` quote mark.
    pub quote: Option<u8>,
}

impl RenderNode {
    /// A blank node of the given kind.
    #[must_use]
    pub fn new(kind: RenderKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            text: None,
            styles: Default::default(),
            flags: NodeFlags::empty(),
            align: None,
            valign: None,
            float: None,
            clear: None,
            size: SizeHint::default(),
            link: None,
            table: None,
            list_marker: None,
            input: None,
            image: None,
            access_keys: Vec::new(),
            generated: None,
            quote: None,
        }
    }

    /// The style of one state.
    #[must_use]
    pub const fn style(&self, state: StyleState) -> &Style {
        &self.styles[state.index()]
    }

    /// Mutable style of one state.
    pub const fn style_mut(&mut self, state: StyleState) -> &mut Style {
        &mut self.styles[state.index()]
    }

    /// True unless hidden.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.flags.contains(NodeFlags::HIDDEN)
    }
}

/// Arena-based render tree. Index 0 is the page root container.
#[derive(Debug, Clone, Serialize)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl RenderTree {
    /// The page root.
    pub const ROOT: RenderId = RenderId(0);

    /// A tree holding just the page root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![RenderNode::new(RenderKind::Container)],
        }
    }

    /// Number of allocated nodes (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: RenderId) -> Option<&RenderNode> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by its ID.
    pub fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(id.0)
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, node: RenderNode) -> RenderId {
        let id = RenderId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocate a detached text run of the given kind.
    pub fn alloc_text(&mut self, kind: RenderKind, text: &str) -> RenderId {
        let mut node = RenderNode::new(kind);
        node.text = Some(text.to_string());
        self.alloc(node)
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: RenderId, child: RenderId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Insert `child` at `index` among `parent`'s children (clamped to the end).
    pub fn insert(&mut self, parent: RenderId, index: usize, child: RenderId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Remove `child` from its parent, if it has one.
    pub fn detach(&mut self, child: RenderId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: RenderId) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, id: RenderId) -> Option<RenderId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node.
    #[must_use]
    pub fn children(&self, id: RenderId) -> &[RenderId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of `id` within its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: RenderId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Pre-order iteration over `id` and everything attached below it.
    #[must_use]
    pub fn descendants(&self, id: RenderId) -> Vec<RenderId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all runs below `id`, separated by spaces.
    #[must_use]
    pub fn text_content(&self, id: RenderId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self[n].text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<RenderId> for RenderTree {
    type Output = RenderNode;

    fn index(&self, id: RenderId) -> &RenderNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<RenderId> for RenderTree {
    fn index_mut(&mut self, id: RenderId) -> &mut RenderNode {
        &mut self.nodes[id.0]
    }
}
